//! The fixed `evaluate_resume` function schema.
//!
//! Twenty fields, all required: nineteen string critiques and one numeric
//! overall score. The declaration sent to the model is built from
//! `REVIEW_FIELDS`, so the order here is the order the model sees.

use serde_json::{json, Map, Value};

use crate::llm_client::FunctionDeclaration;

pub const EVALUATE_RESUME_FUNCTION: &str = "evaluate_resume";

const EVALUATE_RESUME_DESCRIPTION: &str = "Provide a detailed review, enhancement suggestions, \
    and ATS optimization tips for the resume.";

/// JSON schema type of a review field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
}

impl FieldKind {
    fn json_type(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReviewField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

const fn text(name: &'static str, description: &'static str) -> ReviewField {
    ReviewField {
        name,
        kind: FieldKind::String,
        description,
    }
}

pub const REVIEW_FIELDS: [ReviewField; 20] = [
    text(
        "name",
        "Ensure the candidate's name is clearly and prominently displayed on the resume.",
    ),
    text(
        "summary",
        "Provide a compelling and concise summary highlighting the candidate's most relevant \
         experiences and skills.",
    ),
    text(
        "grammar_corrections",
        "Identify and suggest corrections for any grammatical errors found throughout the \
         resume to enhance clarity and professionalism.",
    ),
    text(
        "quantifiers",
        "Recommend adding quantifiers to achievements (e.g., numbers, percentages) to provide \
         measurable results and impacts of the candidate's work.",
    ),
    text(
        "ats_optimization",
        "Provide suggestions to optimize the resume for Applicant Tracking Systems (ATS), \
         ensuring it includes relevant keywords and follows ATS-friendly formatting.",
    ),
    text(
        "company_fit",
        "Evaluate how well the candidate fits with the company's culture and values, assessing \
         alignment with the company's mission and vision.",
    ),
    text(
        "line_suggestions",
        "Offer specific suggestions for improving individual lines in the resume to make them \
         more impactful and relevant to the job role.",
    ),
    text(
        "contact_info",
        "Verify the presence and accuracy of contact information, including email, phone \
         number, and LinkedIn profile.",
    ),
    text(
        "job_titles_dates",
        "Check the clarity and consistency of job titles and dates of employment, ensuring \
         they are formatted correctly and easy to understand.",
    ),
    text(
        "skills_relevance",
        "Assess the relevance of listed technical and soft skills to the desired role, \
         highlighting those that are most pertinent.",
    ),
    text(
        "education_certifications",
        "Verify the accuracy and relevance of educational background and certifications, \
         highlighting those that are most relevant to the job.",
    ),
    text(
        "projects_impact",
        "Ensure the outcomes and impacts of projects are clearly stated, demonstrating the \
         candidate's hands-on experience and contributions.",
    ),
    text(
        "achievements_impact",
        "Highlight significant achievements and their impacts, making sure they are presented \
         in a way that emphasizes their importance.",
    ),
    text(
        "action_verbs",
        "Suggest the use of strong action verbs to describe responsibilities and achievements, \
         making the resume more dynamic and engaging.",
    ),
    text(
        "professional_tone",
        "Ensure the language used in the resume is professional and appropriate for the \
         industry, maintaining a polished and respectful tone.",
    ),
    text(
        "technical_jargon",
        "Ensure technical jargon is used appropriately and is understandable, showcasing the \
         candidate's expertise without overwhelming the reader.",
    ),
    text(
        "redundancies",
        "Identify and suggest removal of redundant information to streamline the resume and \
         maintain conciseness.",
    ),
    text(
        "consistency",
        "Ensure consistency in formatting and verb tense throughout the resume, maintaining a \
         uniform and professional appearance.",
    ),
    text(
        "additional_data_request",
        "Request additional data if necessary to provide a more complete and thorough review \
         of the resume.",
    ),
    ReviewField {
        name: "overall_score",
        kind: FieldKind::Number,
        description: "Provide an overall score for the resume based on all criteria, giving a \
                      quick overview of its quality and effectiveness.",
    },
];

/// True if `name` is one of the twenty declared fields.
pub fn is_review_field(name: &str) -> bool {
    REVIEW_FIELDS.iter().any(|f| f.name == name)
}

/// Builds the `evaluate_resume` declaration sent with the structured call.
pub fn evaluate_resume_declaration() -> FunctionDeclaration {
    let mut properties = Map::new();
    for field in &REVIEW_FIELDS {
        properties.insert(
            field.name.to_string(),
            json!({
                "type": field.kind.json_type(),
                "description": field.description,
            }),
        );
    }
    let required: Vec<Value> = REVIEW_FIELDS.iter().map(|f| json!(f.name)).collect();

    FunctionDeclaration {
        name: EVALUATE_RESUME_FUNCTION,
        description: EVALUATE_RESUME_DESCRIPTION,
        parameters: json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }),
    }
}
