// Resume review prompt templates and fixed user-facing strings.
// All prompts for the review module are defined here.

/// Bumped whenever a template below changes wording.
pub const PROMPT_VERSION: &str = "resume-review-v1";

/// Used in place of `review_text` when the structured result carries none.
pub const NO_REVIEW_PLACEHOLDER: &str = "No detailed review available.";

pub const SUGGESTIONS_HEADING: &str = "**Suggestions for Improvement:**";

/// Shown to the user when the structured call yields no valid review record.
pub const EXTRACTION_FAILED_MESSAGE: &str = "Could not extract resume data.";

pub const IMPROVEMENT_PROMPT_TEMPLATE: &str = "\
You are a professional HR recruiter with expertise in crafting top-tier resumes for tech \
companies, business roles, product management, and other industries. Your goal is to transform \
the following resume into the best version possible. Provide a comprehensive review, addressing \
all relevant aspects such as grammar, quantifiers, ATS optimization, company fit, and impactful \
line-specific suggestions. Ensure to quote specific parts from the resume being referred to for \
suggestions, avoiding comments on names and dates. Your review should be free-flowing and \
narrative in style, offering actionable advice and strategies to significantly enhance the \
resume's effectiveness. When giving suggestions, make sure not to make up any information or \
data, just stick to the facts. Conclude with an overall score that reflects the resume's quality \
and readiness for competitive job markets.
Resume Review: {review_text}
Resume Text: {resume_text}";

/// Substitutes `{key}` placeholders in a single pass, so placeholder-like text
/// inside a substituted value is left untouched.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        for (key, value) in vars {
            let placeholder = format!("{{{key}}}");
            if let Some(after) = tail.strip_prefix(placeholder.as_str()) {
                out.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        out.push('{');
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}
