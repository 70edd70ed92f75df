//! The fixed transcription prompt sent with every page image.
//!
//! Centralising the prompt here keeps the wire client free of prompt
//! engineering and lets unit tests inspect the instruction text without
//! talking to a live model.

/// Instruction sent to the vision model alongside each page image.
///
/// The rules ask for an exact transcription: Markdown for structure, no code
/// fences unless the page itself contains code, no headers/footers/page
/// numbers, and embedded images described inside a `<pdf-text>` marker block
/// so downstream consumers can distinguish descriptions from page text.
pub const TRANSCRIPTION_PROMPT: &str = "\
Task: Transcribe the page from the provided book image.

- Reproduce the text exactly as it appears, without adding or omitting anything.
- Use Markdown syntax to preserve the original formatting (e.g., headings, bold, italics, lists).
- Do not include triple backticks (```) or any other code block markers in your response, unless the page contains code.
- Do not include any headers or footers (for example, page numbers).
- If the page contains an image, or a diagram, describe it in detail. Enclose the description in an <pdf-text> tag. For example:

<pdf-text>
This is an image of a cat.
</pdf-text>
";
