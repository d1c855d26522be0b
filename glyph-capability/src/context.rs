//! `{name, tokens, parent?}`. Contexts form a stack per execution thread;
//! a token authorizes an operation iff some token in the active chain
//! (this context and every ancestor) matches.

use crate::token::Token;

#[derive(Debug, Clone)]
pub struct Context {
    pub name: String,
    pub tokens: Vec<Token>,
}

impl Context {
    pub fn new(name: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self { name: name.into(), tokens }
    }
}
