use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pptmaker_common::{
    DataUri, DocumentAnalysis, GeneratePresentationRequest, GenerateVisualRequest, Presentation,
    PresentationParameters, SlideStyle, SmartArtDensity,
};
use pptmaker_core::{Config, PresentationService};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod document;

pub use document::{document_mime_type, read_document, SUPPORTED_EXTENSIONS};

#[derive(Parser)]
#[command(name = "pptmaker")]
#[command(about = "Turn documents into AI-generated presentations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Override the text model (e.g. gemini-2.0-flash)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Override the image generation model
    #[arg(long, global = true)]
    pub image_model: Option<String>,

    /// Configuration file (TOML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a document (.pdf, .docx, .txt)
    Analyze {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a presentation from a saved analysis
    Generate {
        /// Analysis JSON produced by `analyze`
        #[arg(long)]
        analysis: PathBuf,
        #[command(flatten)]
        params: PresentationArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Analyze a document and generate a presentation from it
    Run {
        file: PathBuf,
        #[command(flatten)]
        params: PresentationArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rewrite the text of one slide
    Regenerate {
        /// Presentation JSON produced by `generate` or `run`
        #[arg(long)]
        presentation: PathBuf,
        /// Id of the slide to rewrite
        #[arg(long)]
        slide: u32,
        #[command(flatten)]
        style: StyleArgs,
        /// Defaults to overwriting the presentation file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a single visual from a description
    Visual {
        prompt: String,
        /// Template and style hints
        #[arg(long)]
        style: Option<String>,
        /// Write the decoded image here instead of printing the data URI
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Browse a presentation in the terminal
    Preview {
        file: PathBuf,
        /// Save regenerated slides here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PresentationArgs {
    /// Target number of slides (chosen by the model when omitted)
    #[arg(long)]
    pub slides: Option<NonZeroU32>,
    #[arg(long, default_value = "Modern")]
    pub template: String,
    /// low | medium | high
    #[arg(long, default_value = "medium")]
    pub density: SmartArtDensity,
    /// e.g. charts, diagrams, web-images
    #[arg(long, default_value = "charts")]
    pub data_viz: String,
    #[arg(long, default_value = "balanced")]
    pub ratio: String,
    #[arg(long, default_value = "professional")]
    pub tone: String,
}

impl From<PresentationArgs> for PresentationParameters {
    fn from(args: PresentationArgs) -> Self {
        PresentationParameters {
            num_slides: args.slides,
            template: args.template,
            smart_art_density: args.density,
            data_viz_preference: args.data_viz,
            content_visual_ratio: args.ratio,
            tone_style: args.tone,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StyleArgs {
    #[arg(long, default_value = "medium")]
    pub density: SmartArtDensity,
    #[arg(long, default_value = "charts")]
    pub data_viz: String,
    #[arg(long, default_value = "balanced")]
    pub ratio: String,
    /// Defaults to the presentation's tone
    #[arg(long)]
    pub tone: Option<String>,
}

impl StyleArgs {
    pub fn into_style(self, presentation: &Presentation) -> SlideStyle {
        SlideStyle {
            smart_art_density: self.density,
            data_visualization_preference: self.data_viz,
            content_to_visual_ratio: self.ratio,
            tone_and_style: self
                .tone
                .unwrap_or_else(|| presentation.metadata.tone_style.clone()),
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(model) = &cli.image_model {
        config.image_model = model.clone();
    }
    Ok(config)
}

pub async fn run_cli() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    if let Commands::Preview { file, output } = &cli.command {
        return preview(config, file, output.as_deref()).await;
    }
    let service = PresentationService::from_config(config)?;

    match cli.command {
        Commands::Analyze { file, output } => {
            let document = read_document(&file).await?;
            let analysis = service
                .analyze_document(&document)
                .await
                .with_context(|| format!("Failed to analyze {}", file.display()))?;
            document::write_json(&analysis, output.as_deref()).await?;
        }
        Commands::Generate {
            analysis,
            params,
            output,
        } => {
            let analysis: DocumentAnalysis = document::read_json(&analysis).await?;
            generate(&service, analysis, params, output.as_deref()).await?;
        }
        Commands::Run {
            file,
            params,
            output,
        } => {
            let document = read_document(&file).await?;
            let analysis = match service.analyze_document(&document).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    tracing::error!("Document analysis failed, continuing without it: {e}");
                    DocumentAnalysis::fallback()
                }
            };
            generate(&service, analysis, params, output.as_deref()).await?;
        }
        Commands::Regenerate {
            presentation: path,
            slide,
            style,
            output,
        } => {
            let mut presentation: Presentation = document::read_json(&path).await?;
            let style = style.into_style(&presentation);
            service
                .regenerate_slide_in(&mut presentation, slide, style)
                .await?;
            document::write_json(&presentation, Some(output.as_deref().unwrap_or(&path))).await?;
        }
        Commands::Visual {
            prompt,
            style,
            output,
        } => {
            let response = service
                .generate_visual(&GenerateVisualRequest {
                    prompt_text: prompt,
                    template_details: style,
                })
                .await?;
            match output {
                Some(path) => save_image(&response.visual_data_uri, &path).await?,
                None => println!("{}", response.visual_data_uri),
            }
        }
        Commands::Preview { .. } => {}
    }

    Ok(())
}

async fn generate(
    service: &PresentationService,
    analysis: DocumentAnalysis,
    params: PresentationArgs,
    output: Option<&Path>,
) -> Result<()> {
    let request = GeneratePresentationRequest {
        analysis_data: analysis,
        parameters: params.into(),
    };
    let presentation = service.generate_presentation(&request).await;
    document::write_json(&presentation, output).await
}

/// Browse a saved presentation; regeneration needs a working API key.
async fn preview(config: Config, file: &Path, output: Option<&Path>) -> Result<()> {
    let presentation: Presentation = document::read_json(file).await?;
    let service = match PresentationService::from_config(config) {
        Ok(service) => Some(Arc::new(service)),
        Err(e) => {
            tracing::warn!("Slide regeneration disabled: {e}");
            None
        }
    };
    let presentation = pptmaker_tui::run_preview(presentation, service).await?;
    if let Some(path) = output {
        document::write_json(&presentation, Some(path)).await?;
    }
    Ok(())
}

async fn save_image(data_uri: &str, path: &Path) -> Result<()> {
    let image = DataUri::parse(data_uri)?;
    if !image.is_image() {
        anyhow::bail!("Visual is {}, not an image", image.mime_type());
    }
    tokio::fs::write(path, image.decode()?)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Saved {} image to {}", image.mime_type(), path.display());
    Ok(())
}
