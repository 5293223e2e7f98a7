pub mod core;
pub mod rag;
pub mod server;
pub mod state;
pub mod vector_math;
