// handlers/mod.rs - two security tiers
//
// Public (no auth): service info and health
// Protected (bearer JWT): products and logout under /api/*

pub mod protected;
pub mod public;
