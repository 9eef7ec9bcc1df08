//! # ufgraph Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the ufgraph library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all ufgraph operations
pub use crate::Error;

/// Why a listing line was rejected
pub use crate::ParseErrorKind;

/// The result type used throughout ufgraph
pub use crate::Result;

// ================================================================================================
// Graph Model
// ================================================================================================

/// Graph of basic blocks and its nodes
pub use crate::graph::{node_name, Graph, Node};

// ================================================================================================
// Parsing
// ================================================================================================

/// Entry points and results of parsing a listing
pub use crate::parser::{parse, parse_str, Frame, FrameReader, ParseOptions, ParseOutput};

/// Single line classification
pub use crate::parser::{FlowType, Instruction};

// ================================================================================================
// Rendering
// ================================================================================================

/// Renderer capability and its implementations
pub use crate::render::{renderer_for, DotWriter, GraphvizRenderer, OutputFormat, Renderer};
