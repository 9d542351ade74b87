//! Follow-up suggestion heuristics.
//!
//! Suggestions are derived from simple keyword checks over the user's
//! message and the assistant's reply; at most three are returned.

const MAX_SUGGESTIONS: usize = 3;

pub fn follow_ups(user_message: &str, response: &str) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::new();

    let user_lower = user_message.to_lowercase();
    let response_lower = response.to_lowercase();

    if user_lower.contains("search") || user_lower.contains("find") {
        suggestions.extend([
            "Show me all products".to_string(),
            "What's in the Electronics category?".to_string(),
            "Compare two products".to_string(),
        ]);
    }

    if user_lower.contains("cart") || user_lower.contains("add") {
        suggestions.extend([
            "Show my cart summary".to_string(),
            "What's my cart total?".to_string(),
            "Continue shopping".to_string(),
        ]);
    }

    if response_lower.contains("product") && response_lower.contains("id") {
        suggestions.extend([
            "Add this to my cart".to_string(),
            "Tell me more about this product".to_string(),
            "Show me similar products".to_string(),
        ]);
    }

    if suggestions.is_empty() {
        suggestions = vec![
            "Search for products".to_string(),
            "Browse categories".to_string(),
            "Check my cart".to_string(),
            "Get shopping recommendations".to_string(),
        ];
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
