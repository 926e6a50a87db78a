use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("failed to set PHP language for parser")]
    LanguageSet,

    #[error("failed to parse source text")]
    ParseFailed,
}
