//! Cross-module tests for the answering pipeline.


mod generation_loop;
