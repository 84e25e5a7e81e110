//! Prompt construction for initial generation and refinement.
//!
//! Both builders are pure and total: they only concatenate the idea, the
//! kind's outline and the shared instruction block.

use crate::documents::DocumentKind;

/// Instruction block appended to every generation prompt.
const GENERATION_INSTRUCTIONS: &str = "Instructions for AI:
- Generate only the content for the requested document section. Do not include any introductory phrases, conversational text, or markdown formatting like ```text ... ``` or ```markdown ... ```.
- For any specific data points like financial figures, market sizes, or statistics that you cannot factually verify or source, use clear placeholders (e.g., \"[Insert specific data here]\", \"[Source: research needed]\", \"[Estimated figure, verify with market data]\") or state that the figures are illustrative. Do not invent specific numbers.
- Ensure the content is professional, well-structured, and directly usable.
- Focus on accuracy and realistic assumptions.";

/// Build the prompt that generates `kind` from scratch for `idea`.
pub fn build_generation_prompt(idea: &str, kind: DocumentKind) -> String {
    format!(
        "Business Idea: \"{idea}\"\n\n{outline}\n\n{GENERATION_INSTRUCTIONS}",
        outline = kind.outline(),
    )
}

/// Build the prompt that revises `original_content` according to `edit_request`.
pub fn build_refinement_prompt(
    kind: DocumentKind,
    original_content: &str,
    edit_request: &str,
) -> String {
    let name = kind.display_name();
    format!(
        "You are an AI assistant helping to refine a business document.
The original document is a {name}.
Here is the original content:
---
{original_content}
---
The user wants to make the following changes or has the following request: \"{edit_request}\".

Instructions for AI:
- Provide only the revised {name} content directly. Do not include any introductory or concluding remarks like \"Here is the revised document:\". Do not use markdown formatting like ```text ... ``` or ```markdown ... ```.
- Incorporate the user's changes.
- If the request involves data that requires external verification (e.g., specific financial numbers, market statistics), and you cannot verify it, use placeholders (e.g., \"[Insert specific data here]\", \"[Verify this figure]\") or state that the information is illustrative. Do not invent specific numbers.
- Ensure the revised document maintains a professional tone and structure suitable for a {name}.
- Preserve the overall purpose and core information of the original document unless specifically asked to change it.
- If the request is vague, make reasonable interpretations to improve the document.
- If the request asks to add a section, integrate it logically. If it asks to remove something, ensure the document still flows well.
- Pay attention to formatting, clarity, and conciseness."
    )
}
