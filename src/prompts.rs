//! Prompts for the model-backed stages: translation and the report chain.
//!
//! Every prompt lives here so a wording change touches one file and tests
//! can inspect the text without a live model. The system prompts set the
//! role; the user message carries the document text.

/// System prompt for translating recovered Devanagari text to English.
pub const TRANSLATION_PROMPT: &str = r#"Translate the following Hindi/Devanagari text to English.
Keep technical terms as is, and maintain any numerical values or measurements exactly.
Preserve formatting and structure of the text, including the "=== Page N ===" markers.

Please provide a clear and accurate translation while keeping technical terminology intact.
Output ONLY the translation, without commentary."#;

/// Stage 1 of the report chain: verbatim extraction.
pub const RESEARCH_INSTRUCTIONS: &str = r#"Extract and organize the following content exactly as it appears in the document.

CRITICAL RULES:
1. DO NOT add any information that is not in the document
2. DO NOT make creative interpretations or expansions
3. DO NOT reorganize or restructure the content's original flow
4. Copy text verbatim where possible, maintaining exact wording
5. Preserve all numerical data, statistics, and figures exactly as they appear

Extract and organize the following sections IN ORDER:
1. Title (from the beginning of the document)
2. Authors (if present)
3. Abstract/Introduction
4. Main Content (maintaining original structure)
5. Conclusions
6. References

For each section:
- Use exact quotes from the document
- Maintain original paragraph structure
- Keep all numerical values unchanged
- Preserve technical terminology exactly
- Keep citations in their original format

If a section is not present, say so explicitly."#;

/// Stage 2 of the report chain: structure the extracted content.
///
/// `brand_context` only ever affects presentation; an empty string drops the
/// brand section entirely.
pub fn content_instructions(brand_context: &str) -> String {
    let mut prompt = String::from(
        r#"Using ONLY the extracted content provided, create a structured document.

CRITICAL REQUIREMENTS:
1. Use ONLY information present in the source material
2. DO NOT add any new information, interpretations, or expansions
3. DO NOT modify or paraphrase technical content
4. Maintain all original data, figures, and statistics exactly
5. Keep all technical terminology unchanged

Structure the content as follows:
1. Title: Use the exact original title
2. Authors: List all authors as shown in the source
3. Main Content: Follow the original document's structure
   - Keep original section headings
   - Maintain original paragraph organization
   - Use verbatim quotes for key findings
   - Keep all numerical data unchanged
4. Conclusions: Use the original conclusions
5. References: Include all original references in their exact format"#,
    );
    let brand = brand_context.trim();
    if !brand.is_empty() {
        prompt.push_str("\n\nBrand Context:\n");
        prompt.push_str(brand);
        prompt.push_str(
            "\n\nApply branding ONLY to visual formatting, never to modify the actual content.",
        );
    }
    prompt
}

/// Stage 3 of the report chain: markdown formatting only.
pub const FORMAT_INSTRUCTIONS: &str = r#"Format the document while preserving exact content.

CRITICAL RULES:
1. DO NOT modify any content
2. DO NOT add or remove information
3. DO NOT rewrite or paraphrase
4. Maintain all technical terms exactly

Apply only these formatting elements:
1. Basic Structure:
   - # for document title
   - ## for main sections
   - ### for subsections
   - Basic lists (when present in original)
   - Simple tables (when present in original)

2. Text Formatting:
   - Preserve original paragraph breaks
   - Maintain original list structures
   - Retain original emphasis (bold/italic) if present

Output ONLY the formatted Markdown. Do NOT wrap it in ```markdown fences."#;

/// Names of the five originality criteria, in rubric order.
pub const RUBRIC_CRITERIA: [&str; 5] = [
    "Writing Style Originality",
    "Content Structure",
    "Language and Vocabulary",
    "Idea Development",
    "Technical Elements",
];

/// Stage 5 of the report chain: originality scoring.
///
/// The answer is parsed by [`crate::report::parse_score`].
pub const PLAGIARISM_RUBRIC: &str = r#"You are an expert in content verification and plagiarism detection.
Score the content against these criteria, each worth 20 points:

1. Writing Style Originality (20 points): unique sentence structures, personal voice and tone, avoidance of cliches
2. Content Structure (20 points): original organization, flow and transitions, section arrangement
3. Language and Vocabulary (20 points): word choice, varied vocabulary, original expressions
4. Idea Development (20 points): original perspectives, insights, creative connections
5. Technical Elements (20 points): original examples, data presentation, use of technical terms

The total score (0-100) is the sum of the criteria scores, where 100 is completely original.

Respond with a single JSON object and nothing else:
{"criteria": [{"name": "<criterion>", "score": <0-20>}, ...], "total": <0-100>, "analysis": "<specific examples, areas for improvement and recommendations>"}"#;
