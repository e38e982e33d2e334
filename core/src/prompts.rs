//! Prompt templates for every model call.

use pptmaker_common::{GeneratePresentationRequest, GenerateVisualRequest, RegenerateSlideRequest};
use std::fmt::Write;

pub const ANALYSIS_INSTRUCTIONS: &str = "\
You are an expert AI document analyzer. Read the attached document carefully, \
understand its content and extract the key information.

Instructions:
1. Analyze content: read the whole document and extract its text accurately.
2. Key topics: determine the main subjects or themes discussed.
3. Subtopics: for each key topic, identify related sub-points or secondary themes.
4. Data points: extract significant numbers, statistics or factual points.
5. Key quotes: identify impactful or representative sentences or phrases.
6. Summary: give a concise summary of the document's overall message and purpose.

Return the extracted information strictly in the requested JSON format. Populate \
every field (topics, subtopics, dataPoints, quotes, summary). When nothing relevant \
is found, use an empty array for list fields and an empty string for the summary.";

pub const STRUCTURE_SYSTEM: &str = "\
You are an AI Presentation Assistant. Your primary goal is to structure a presentation \
and identify relevant VISUALS FROM THE WEB using the webSearch tool. Only suggest AI \
generation for charts, graphs, or diagrams when the content and preferences call for it; \
otherwise search the web for existing images. Strictly adhere to the output JSON schema.";

pub const STRUCTURE_SYSTEM_NO_SEARCH: &str = "\
You are an AI Presentation Assistant. Your primary goal is to structure a presentation \
and describe a suitable visual for the slides that need one. Strictly adhere to the \
output JSON schema.";

fn bullet_list(out: &mut String, label: &str, items: &[String], quoted: bool) {
    let _ = write!(out, "{label}:");
    if items.is_empty() {
        out.push_str(" (none)");
    }
    for item in items {
        if quoted {
            let _ = write!(out, "\n- \"{item}\"");
        } else {
            let _ = write!(out, "\n- {item}");
        }
    }
    out.push('\n');
}

/// Style hints handed to the Visualizer for every slide of a deck.
pub fn template_details(template: &str, tone_style: &str) -> String {
    format!("Template: {template}, Style: {tone_style}")
}

pub fn structure_prompt(request: &GeneratePresentationRequest, web_search: bool) -> String {
    let analysis = &request.analysis_data;
    let params = &request.parameters;
    let mut out = String::new();

    out.push_str(
        "Create a presentation structure based on the document analysis and user preferences.\n\n",
    );
    out.push_str("**Document Analysis:**\n");
    let _ = writeln!(out, "Summary: {}", analysis.summary);
    bullet_list(&mut out, "Topics", &analysis.topics, false);
    bullet_list(&mut out, "Subtopics", &analysis.subtopics, false);
    bullet_list(&mut out, "Data Points", &analysis.data_points, false);
    bullet_list(&mut out, "Quotes", &analysis.quotes, true);

    out.push_str("\n**User Preferences:**\n");
    match params.num_slides {
        Some(n) => {
            let _ = writeln!(out, "Target Number of Slides: {n}");
        }
        None => out.push_str(
            "Number of Slides: Determine automatically based on content (aim for conciseness).\n",
        ),
    }
    let _ = writeln!(out, "Template: {}", params.template);
    let _ = writeln!(out, "Smart Art/Visual Density: {}", params.smart_art_density);
    let _ = writeln!(
        out,
        "Data Visualization Preference: {} (Use 'web-images' to prioritize web search)",
        params.data_viz_preference
    );
    let _ = writeln!(out, "Content/Visual Ratio: {}", params.content_visual_ratio);
    let _ = writeln!(out, "Tone & Style: {}", params.tone_style);

    out.push_str("\n**Instructions:**\n");
    out.push_str(
        "1. Slide structure: decide slide titles and key text. Start with a title slide, end \
         with a conclusion, distribute information logically. Number slide ids from 1 in order.\n",
    );
    let _ = writeln!(
        out,
        "2. Content: write concise text for each slide in a {} tone.",
        params.tone_style
    );
    let _ = writeln!(
        out,
        "3. Visual needs: based on the slide content and the preferences ({}, {}, {}), decide \
         whether a visual is needed.",
        params.smart_art_density, params.content_visual_ratio, params.data_viz_preference
    );
    if web_search {
        out.push_str(
            "4. Find or describe visuals (prioritize web search):\n\
             - If an IMAGE is suitable: put a concise search query in `visualPrompt` \
             (e.g. \"modern office building\"), call the `webSearch` tool with it, and if a \
             result is a clear image URL (picsum.photos, or ending in .jpg/.png) set \
             `visualDataUri` to the most relevant one. If no suitable image URL comes back, \
             leave `visualDataUri` null. Never generate the image yourself.\n\
             - If a CHART, GRAPH, DIAGRAM or INFOGRAPHIC fits better: put a clear, descriptive \
             generation prompt in `visualPrompt` (e.g. \"Bar chart showing sales data: Q1 $50k, \
             Q2 $75k\") and leave `visualDataUri` null; it will be generated later.\n\
             - If no visual is needed: leave both fields null.\n",
        );
    } else {
        out.push_str(
            "4. Describe visuals:\n\
             - If a visual helps the slide, put a clear, descriptive generation prompt in \
             `visualPrompt` (e.g. \"Diagram illustrating the 3-step process\") and leave \
             `visualDataUri` null; it will be generated later.\n\
             - If no visual is needed: leave both fields null.\n",
        );
    }
    out.push_str(
        "5. Output: return the complete presentation as JSON matching the output schema. \
         `visualDataUri` may only hold a web URL returned by the search tool.\n\n",
    );

    out.push_str("**Example slides:**\n");
    if web_search {
        out.push_str(
            "{ \"id\": 1, \"title\": \"Future Workspace\", \"content\": \"Collaboration is key.\", \
             \"visualPrompt\": \"modern collaborative office space\", \"visualDataUri\": \
             \"https://picsum.photos/seed/modern-collaborative-office-space/400/300\" }\n",
        );
    }
    out.push_str(
        "{ \"id\": 2, \"title\": \"Sales Performance Q1\", \"content\": \"Sales increased by 15% \
         in Q1.\", \"visualPrompt\": \"Bar chart showing Q1 sales growth of 15%\", \
         \"visualDataUri\": null }\n\
         { \"id\": 3, \"title\": \"Key Takeaways\", \"content\": \"Focus on customer retention.\", \
         \"visualPrompt\": null, \"visualDataUri\": null }\n",
    );
    out
}

pub fn visual_prompt(request: &GenerateVisualRequest) -> String {
    let mut out = String::from(
        "You are an AI presentation design assistant. Create ONE clean, presentation-ready image \
         (smart art, chart, graph, diagram or infographic) for a slide.\n\n",
    );
    let _ = writeln!(out, "Visual to create: {}", request.prompt_text);
    if let Some(details) = request.template_details.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(out, "Style guidance: {details}");
    }
    out.push_str(
        "\nUse legible labels, a simple layout and colors that fit the style guidance. \
         Respond with the image.",
    );
    out
}

pub fn regenerate_prompt(request: &RegenerateSlideRequest) -> String {
    let style = &request.style;
    format!(
        "You are an AI presentation designer. Regenerate one slide so the presentation better \
         fits the user's parameters.\n\n\
         The slide content is: {content}\n\
         The template details are: {template}\n\n\
         Consider the following parameters when regenerating the slide:\n\
         - Smart Art Density: {density}\n\
         - Data Visualization Preference: {viz}\n\
         - Content to Visual Ratio: {ratio}\n\
         - Tone and Style: {tone}\n\n\
         Return only the updated slide content. The design should follow the selected \
         template: {template}",
        content = request.slide_content,
        template = request.template_details,
        density = style.smart_art_density,
        viz = style.data_visualization_preference,
        ratio = style.content_to_visual_ratio,
        tone = style.tone_and_style,
    )
}
