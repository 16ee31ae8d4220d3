//! Fixed instructional templates sent as the system message.
//!
//! One template per [`PromptVariant`]: full website generation with the
//! marker contract, and prompt enhancement.

use webllama_core::PromptVariant;

/// System template for full website generation.
///
/// The marker format is a hard contract: the response parser extracts
/// exactly the segments between these literal markers.
pub const GENERATE_SYSTEM_PROMPT: &str = r#"You are an expert web developer. Your task is to generate a complete, visually stunning, and fully responsive website based on the user's description.

Generate clean, semantic HTML, modern CSS with responsive design, and functional JavaScript if needed. The website should be:
- Fully responsive (mobile-first design)
- Modern and visually appealing
- Accessible and SEO-friendly
- Include proper meta tags
- Use modern CSS features (flexbox, grid, etc.)
- Include smooth animations and transitions
- Follow best practices

Return ONLY the code in this exact format:
<!-- HTML_START -->
[HTML code here]
<!-- HTML_END -->

<!-- CSS_START -->
[CSS code here]
<!-- CSS_END -->

<!-- JS_START -->
[JavaScript code here]
<!-- JS_END -->

Make sure the output is a complete, professional-grade website ready for deployment."#;

/// System template for prompt enhancement.
pub const ENHANCE_SYSTEM_PROMPT: &str = r#"You are a prompt enhancement expert. Transform the user's basic request into a detailed, actionable prompt for website generation.

The enhanced prompt should include:
- Specific Design Style and Color Scheme
- Layout Structure
- Interactive Elements
- Responsive Design
- Modern UI/UX Principles

Return only the enhanced prompt, nothing else."#;

/// Returns the system template for the given variant.
pub fn system_prompt(variant: PromptVariant) -> &'static str {
    match variant {
        PromptVariant::Generate => GENERATE_SYSTEM_PROMPT,
        PromptVariant::Enhance => ENHANCE_SYSTEM_PROMPT,
    }
}
