//! # Introduction
//!
//! `rpgcode` is a front end for RPGCode, the scripting language of the
//! RPG Toolkit. It turns source text into a typed syntax tree and reports
//! every grammar error with its line and column, without stopping at the
//! first one.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → CompilationUnit (+ ParseErrors)
//! ```
//!
//! 1. [`parser`]: the lexer, the recursive descent parser, the AST and
//!    the error listener API.
//! 2. [`driver`]: checks files and directories of programs and summarizes
//!    the results; used by the `rpgcode` binary.

pub mod driver;
pub mod parser;
