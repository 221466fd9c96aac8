//! System prompt constants and builders for the assistant collaborator.

use crate::session::UserContext;

/// Fixed reply persisted and returned whenever the assistant collaborator
/// fails (error, timeout, malformed output).
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response.";

/// Base instructions for the recommendation assistant. Replies either stay
/// plain text or use the `<PRODUCT>` marker format the parser expects.
const RECOMMENDER_BASE: &str = r#"You are an AI assistant designed to help users choose products.

STRICT INSTRUCTIONS - FOLLOW CAREFULLY:
1. If the user asks about buying a product, give a brief overview (max 200 words) of what key metrics or criteria to consider for that product type.
2. If the user requests recommendations, return ONLY up to 3 products, each with:
    - A name
    - A short description (max 100 words)
    - Use the following format for each product:
      <PRODUCT> - [Product Name] - [Short Description]
3. If the prompt is NOT about a product or recommendation, reply exactly with:
    "I am sorry but this box is only for the suggestion of products, please insert a new prompt."
4. NEVER include more than 3 products. NEVER respond outside the specified format.
Use EXACTLY the following format for each product (no numbering allowed!):
<PRODUCT> - [Product Name] - [Short Description]
Do NOT use any numbering like "1.", "2.", etc. Only use <PRODUCT> tags."#;

/// Builds the recommender system prompt, appending whatever user context and
/// accumulated keywords are available.
pub fn recommender_system_prompt(context: Option<&UserContext>, keywords: &[String]) -> String {
    let mut prompt = RECOMMENDER_BASE.to_string();

    if let Some(ctx) = context {
        if let Some(age) = ctx.age {
            prompt.push_str(&format!(" The user is {} years old.", age));
        }
        if let Some(gender) = &ctx.gender {
            prompt.push_str(&format!(" The user is a {}.", gender));
        }
        if let Some(country) = &ctx.country {
            prompt.push_str(&format!(" The user is from {}.", country));
        }
    }
    if !keywords.is_empty() {
        prompt.push_str(&format!(
            " The user's key concerns are: {}.",
            keywords.join(", ")
        ));
    }

    prompt
}

/// System prompt for one level of the category descent: the product plus the
/// bounded option set for this level only.
pub fn category_system_prompt(
    product_name: &str,
    product_description: &str,
    options: &[String],
) -> String {
    let option_list = serde_json::to_string_pretty(options).unwrap_or_else(|_| options.join(", "));
    format!(
        r#"You are a product categorization assistant.

Given a product name and description, and a list of category options at a specific level,
choose the most appropriate category.

Product Name: {product_name}
Description: {product_description}

Categories:
{option_list}

Only return ONE category name from the list above that best fits. Do NOT explain."#
    )
}

/// User message sent with every category-level query.
pub const CATEGORY_USER_PROMPT: &str = "Select the best fitting category from the list.";

/// System prompt for title generation from accumulated keywords.
pub const TITLE_SYSTEM_PROMPT: &str = r#"You are a product recommendation assistant.

Your ONLY task is to generate a title based on a list of keywords from a user conversation.

Follow these strict rules:
1. Wrap the title with <TITLE> and </TITLE> tags.
2. The title must be between 5 and 10 words.
3. DO NOT include any other tags like <think>, <response>, or explanations.
4. DO NOT explain, comment, list, or return anything except the title.
5. Output must contain ONLY the <TITLE> tag and the final title.

Example:
<TITLE>Best Budget Smartphones for Gaming Enthusiasts</TITLE>"#;
