//! Prompt templates for the resume extraction call. The schema asks
//! only for what the model can read off the page; the derived fields
//! (total experience, fresher flag) are computed locally and never
//! requested.

pub const EXTRACTION_SYSTEM: &str = "\
You are a precise resume parser. \
You MUST respond with valid JSON only: no markdown fences, no explanations. \
Extract only information present in the text; never invent values. \
If a value is not found, use null for strings and [] for arrays. \
Keep skills in the order they appear in the document.";

pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Parse the following resume text and return a JSON object with exactly this structure:
{
  "name": "string" | null,
  "emails": ["string"],
  "phone_numbers": ["string"],
  "skills": ["string"],
  "work_history": [{
    "employer": "string" | null,
    "title": "string" | null,
    "start": "string" | null,
    "end": "string" | null,
    "duration": "string" | null
  }]
}

RULES:
1. "start" and "end" are the period strings as written, e.g. "Jan 2020", "2020-01", "03/2021".
2. Use "Present" as "end" for a current position.
3. "duration" is the raw duration text if the resume states one, e.g. "2 years 3 months".
4. List every employment entry separately, most recent first.
5. Return ONLY the JSON object, nothing else.

RESUME TEXT:
{resume_text}"#;

pub const REPAIR_PROMPT_TEMPLATE: &str = r#"Your previous reply could not be parsed into the required schema.

Parse error: {error}

Previous reply:
{previous_reply}

Return ONLY the corrected JSON object matching the schema exactly, with no fences and no commentary."#;

pub fn extraction_prompt(resume_text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

pub fn repair_prompt(previous_reply: &str, error: &str) -> String {
    REPAIR_PROMPT_TEMPLATE
        .replace("{error}", error)
        .replace("{previous_reply}", previous_reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_embeds_text() {
        let prompt = extraction_prompt("Jane Doe, engineer");
        assert!(prompt.contains("Jane Doe, engineer"));
        assert!(prompt.contains("\"work_history\""));
    }

    #[test]
    fn test_repair_prompt_embeds_reply_and_error() {
        let prompt = repair_prompt("{bad json", "expected value at line 1");
        assert!(prompt.contains("{bad json"));
        assert!(prompt.contains("expected value at line 1"));
    }
}
