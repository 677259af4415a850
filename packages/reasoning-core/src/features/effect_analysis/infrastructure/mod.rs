pub mod analyzer;
pub mod call_registry;
pub mod differ;
pub mod text_ast_view;

pub use analyzer::EffectAnalyzer;
pub use differ::EffectDiffer;
pub use text_ast_view::TextAstView;
