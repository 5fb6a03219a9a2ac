//! Stop words excluded from keyword extraction.
//!
//! Vaults are frequently mixed-language, so the list covers the highest
//! frequency function words of English, Spanish, German and French. Tokens
//! shorter than three characters never reach this filter.

pub const STOP_WORDS: &[&str] = &[
    // English
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can",
    "had", "her", "was", "one", "our", "out", "has", "him", "his", "how",
    "its", "may", "new", "now", "old", "see", "two", "way", "who", "did",
    "get", "use", "that", "with", "have", "this", "will", "your", "from",
    "they", "know", "want", "been", "good", "much", "some", "time", "very",
    "when", "come", "here", "just", "like", "long", "make", "many", "more",
    "only", "over", "such", "take", "than", "them", "well", "were", "what",
    "which", "their", "would", "there", "about", "could", "other", "these",
    "first", "after", "where", "being", "every", "does", "into", "also",
    "because", "between", "through", "during", "before", "should", "while",
    // Spanish
    "que", "los", "las", "una", "por", "con", "para", "del", "est", "esta",
    "este", "pero", "mas", "como", "sus", "ser", "tiene", "entre", "sobre",
    "hay", "donde", "cuando", "muy", "sin", "tambien", "hasta", "desde",
    // German
    "der", "die", "das", "und", "ist", "von", "mit", "den", "dem", "ein",
    "eine", "auch", "auf", "nicht", "sich", "des", "als", "wie", "aber",
    "nach", "bei", "aus", "wenn", "nur", "noch", "werden", "hat", "sind",
    "einer", "einem", "oder", "zum", "zur", "ber", "dass",
    // French
    "les", "des", "est", "dans", "pour", "qui", "pas", "sur", "sont", "avec",
    "son", "une", "ses", "ont", "mais", "nous", "vous", "fait", "plus",
    "tout", "comme", "elle", "bien", "peut", "aussi", "cette", "ces",
];
