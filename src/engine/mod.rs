pub mod filter;
pub mod key_stats;
pub mod learning_rate;
pub mod ngram_stats;
pub mod scoring;
pub mod skill_tree;
