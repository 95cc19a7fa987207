pub mod token_vault;
