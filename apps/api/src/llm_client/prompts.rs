// Shared prompt fragments. Each generator keeps its own templates in
// generation/prompts.rs; this file holds the cross-cutting pieces.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant for an \
    engineering-education platform. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every content prompt.
pub const ACCURACY_INSTRUCTION: &str = "\
    Content must be factually accurate and appropriate for university engineering students. \
    If you are unsure about a fact, leave it out rather than guessing.";
