//! Prompt and response schema for a reading.
//!
//! Pure construction: building never fails. Word validation is the model's
//! job, not ours.

use serde_json::{json, Value};

use orakle_llm::GenerateContentRequest;

use super::reading::Query;

/// The coins the model may choose from, in prompt order.
pub const COIN_POOL: [&str; 25] = [
    "Bitcoin",
    "Ethereum",
    "Solana",
    "Dogecoin",
    "XRP",
    "Cardano",
    "Monero",
    "Chainlink",
    "Avalanche",
    "Uniswap",
    "Aave",
    "Polkadot",
    "Pepe",
    "Shiba Inu",
    "Arbitrum",
    "Optimism",
    "Near Protocol",
    "Fantom",
    "Injective",
    "Sui",
    "Aptos",
    "Maker",
    "Compound",
    "Curve",
    "Lido",
];

const PERSONA: &str = "\
You are a deeply intuitive, poetic crypto personality orakle.
You are direct, evocative, and occasionally unsettling in your accuracy.";

const RULES: &str = "\
Rules:
- Match based on the PERSONALITY, philosophy, and cultural identity of the coin, not its technology
- The verdict must feel personal and intimate, not like a Wikipedia article
- The uncomfortable truth must hit like a horoscope that knows too much: specific, not vague, slightly unsettling
- The three traits should bridge the person's words to the coin's actual character";

const OUTPUT_REQUIREMENTS: &str = "\
Output Requirements:
- Always return valid JSON that matches the schema.
- If is_valid is false, still include all fields with safe defaults:
  coin: \"None\", ticker: \"\", verdict: \"\", traits: [], uncomfortable_truth: \"\"";

/// Build the instruction text for one query.
pub fn build_prompt(query: &Query) -> String {
    let [w1, w2, w3] = query.words();
    let quoted = format!("\"{w1}\", \"{w2}\", \"{w3}\"");

    let mut prompt = String::new();
    prompt.push_str(PERSONA);
    prompt.push_str("\n\nA person described themselves with exactly three words:\n");
    prompt.push_str(&quoted);
    prompt.push_str(".\n\n");

    prompt.push_str("Step 1: Strict Validation\n");
    prompt.push_str(&format!("Analyze the three words: {quoted}.\n"));
    prompt.push_str(
        "Determine if ALL THREE words are personality traits, human emotions, or descriptions \
         of a person's character or state of being.\n\
         - If ANY word is an object (e.g., 'car', 'pizza'), a place (e.g., 'London'), a random \
         noun (e.g., 'cloud'), or otherwise unrelated to human personality/emotion, you MUST set \
         'is_valid' to false.\n\
         - In 'error_message', explain that the orakle only accepts words that describe the soul, \
         character, or emotional state. Be poetic but firm.\n\
         - If all words are valid, set 'is_valid' to true.\n\n",
    );

    prompt.push_str("Step 2: Matching (Only if is_valid is true)\n");
    prompt.push_str("Match them to ONE real cryptocurrency.\n");
    prompt.push_str(
        "Choose from this pool based on personality fit only, never price or market cap:\n",
    );
    prompt.push_str(&COIN_POOL.join(", "));
    prompt.push_str("\n\n");

    prompt.push_str(RULES);
    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_REQUIREMENTS);
    prompt
}

/// Structured-output schema for a reading. Only `is_valid` is required.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "is_valid": { "type": "BOOLEAN" },
            "error_message": { "type": "STRING" },
            "coin": { "type": "STRING" },
            "ticker": { "type": "STRING" },
            "verdict": { "type": "STRING" },
            "traits": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "uncomfortable_truth": { "type": "STRING" }
        },
        "required": ["is_valid"]
    })
}

/// Full generation request: prompt plus JSON schema.
pub fn build_request(query: &Query) -> GenerateContentRequest {
    GenerateContentRequest::json_prompt(build_prompt(query), response_schema())
}
