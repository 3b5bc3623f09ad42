pub mod llm_schemas;
