use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pptmaker_common::{Presentation, SlideStyle, VisualPrompt};
use pptmaker_core::PresentationService;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewAction {
    Next,
    Previous,
    Regenerate,
    Quit,
    Ignore,
}

impl From<KeyCode> for PreviewAction {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => PreviewAction::Quit,
            KeyCode::Left | KeyCode::Char('h') => PreviewAction::Previous,
            KeyCode::Right | KeyCode::Char('l') => PreviewAction::Next,
            KeyCode::Char('r') => PreviewAction::Regenerate,
            _ => PreviewAction::Ignore,
        }
    }
}

pub struct SlidePreview {
    presentation: Presentation,
    service: Option<Arc<PresentationService>>,
    current_slide: usize,
    status: String,
    running: bool,
}

impl SlidePreview {
    pub fn new(presentation: Presentation, service: Option<Arc<PresentationService>>) -> Self {
        let status = if service.is_some() {
            "←/→ navigate  r regenerate  q quit"
        } else {
            "←/→ navigate  q quit (regeneration unavailable)"
        };
        Self {
            presentation,
            service,
            current_slide: 0,
            status: status.to_string(),
            running: true,
        }
    }

    pub fn current_slide(&self) -> usize {
        self.current_slide
    }

    pub fn into_presentation(self) -> Presentation {
        self.presentation
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while self.running {
            terminal.draw(|f| self.draw(f))?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if self.apply(PreviewAction::from(key.code)) == PreviewAction::Regenerate {
                    self.status = "Regenerating slide...".to_string();
                    terminal.draw(|f| self.draw(f))?;
                    self.regenerate_current().await;
                }
            }
        }
        Ok(())
    }

    /// Apply navigation and quit; regeneration is left to the caller.
    pub fn apply(&mut self, action: PreviewAction) -> PreviewAction {
        match action {
            PreviewAction::Quit => self.running = false,
            PreviewAction::Previous => self.previous_slide(),
            PreviewAction::Next => self.next_slide(),
            PreviewAction::Regenerate | PreviewAction::Ignore => {}
        }
        action
    }

    async fn regenerate_current(&mut self) {
        let Some(service) = self.service.clone() else {
            self.status = "Regeneration unavailable: no API key configured".to_string();
            return;
        };
        let Some(slide_id) = self.presentation.slides.get(self.current_slide).map(|s| s.id) else {
            return;
        };
        let style = SlideStyle {
            tone_and_style: self.presentation.metadata.tone_style.clone(),
            ..SlideStyle::default()
        };

        self.status = match service
            .regenerate_slide_in(&mut self.presentation, slide_id, style)
            .await
        {
            Ok(()) => format!("Slide {slide_id} regenerated"),
            Err(e) => {
                tracing::error!("Failed to regenerate slide {slide_id}: {e}");
                format!("Regeneration failed: {e}")
            }
        };
    }

    fn draw(&self, f: &mut Frame) {
        let [body, visual, footer] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .areas(f.area());

        let Some(slide) = self.presentation.slides.get(self.current_slide) else {
            f.render_widget(
                Paragraph::new("No slides").block(Block::default().borders(Borders::ALL)),
                body,
            );
            return;
        };

        let title = format!(
            "{} ({}/{}) [{}]",
            slide.title,
            self.current_slide + 1,
            self.presentation.slides.len(),
            self.presentation.metadata.template
        );
        let content = Paragraph::new(slide.content.as_str())
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(content, body);

        let mut lines = Vec::new();
        match &slide.visual_prompt {
            VisualPrompt::Prompt(prompt) => lines.push(Line::from(format!("Prompt: {prompt}"))),
            VisualPrompt::Error(message) => {
                lines.push(Line::from(message.as_str()).style(Style::default().fg(Color::Red)))
            }
            VisualPrompt::None => {}
        }
        lines.push(Line::from(match slide.visual_kind() {
            Some(kind) => format!("Visual: {kind}"),
            None => "Visual: none".to_string(),
        }));
        let visual_info = Paragraph::new(lines)
            .block(Block::default().title("Visual").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(visual_info, visual);

        f.render_widget(
            Paragraph::new(self.status.as_str()).style(Style::default().fg(Color::DarkGray)),
            footer,
        );
    }

    fn next_slide(&mut self) {
        if self.current_slide < self.presentation.slides.len().saturating_sub(1) {
            self.current_slide += 1;
        }
    }

    fn previous_slide(&mut self) {
        if self.current_slide > 0 {
            self.current_slide -= 1;
        }
    }
}
