//! Python bindings for the Whiteword tokenizer

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;
use std::sync::Once;
use whiteword_core::{
    Catalog, PatTable, Table, Token as CoreToken, Tokenizer, TokenizerConfig, TokenizerError,
};

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber for the core crate.
///
/// Only takes effect when RUST_LOG is set, e.g. `RUST_LOG=whiteword_core=trace`.
/// Safe to call multiple times.
#[pyfunction]
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn to_py_err(err: TokenizerError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Python-exposed token
#[pyclass]
#[derive(Clone)]
pub struct Token {
    #[pyo3(get)]
    pub text: String,
    #[pyo3(get)]
    pub start: usize,
    #[pyo3(get)]
    pub end: usize,
    #[pyo3(get)]
    pub is_match: bool,
    #[pyo3(get)]
    pub is_last: bool,
    #[pyo3(get)]
    pub is_skip: bool,
}

impl From<&CoreToken<'_>> for Token {
    fn from(token: &CoreToken<'_>) -> Self {
        Self {
            text: token.text.to_string(),
            start: token.span.start,
            end: token.span.end,
            is_match: token.is_match(),
            is_last: token.is_last(),
            is_skip: token.is_skip(),
        }
    }
}

#[pymethods]
impl Token {
    fn __repr__(&self) -> String {
        format!(
            "Token(text='{}', start={}, end={}, is_match={}, is_last={}, is_skip={})",
            self.text,
            self.start,
            self.end,
            if self.is_match { "True" } else { "False" },
            if self.is_last { "True" } else { "False" },
            if self.is_skip { "True" } else { "False" },
        )
    }

    fn to_dict(&self) -> HashMap<String, PyObject> {
        Python::with_gil(|py| {
            let mut map = HashMap::new();
            map.insert("text".to_string(), self.text.to_object(py));
            map.insert("start".to_string(), self.start.to_object(py));
            map.insert("end".to_string(), self.end.to_object(py));
            map.insert("is_match".to_string(), self.is_match.to_object(py));
            map.insert("is_last".to_string(), self.is_last.to_object(py));
            map.insert("is_skip".to_string(), self.is_skip.to_object(py));
            map
        })
    }
}

/// Python-exposed white-word tokenizer
#[pyclass]
pub struct WhiteTokenizer {
    catalog: Catalog,
    config: TokenizerConfig,
}

impl WhiteTokenizer {
    fn tokenizer(&self) -> PyResult<Tokenizer<'_>> {
        Tokenizer::bind(&self.catalog, &self.config).map_err(to_py_err)
    }
}

#[pymethods]
impl WhiteTokenizer {
    /// Create a tokenizer over a word list
    ///
    /// Args:
    ///     words: Dictionary entries (already normalized)
    ///     table_name: Name the dictionary is registered under
    ///     batch_capacity: Hits fetched per dictionary scan (default: 1024)
    #[new]
    #[pyo3(signature = (words, table_name=None, batch_capacity=1024))]
    fn new(words: Vec<String>, table_name: Option<String>, batch_capacity: usize) -> PyResult<Self> {
        let config = match table_name {
            Some(name) => TokenizerConfig::default().with_table_name(name),
            None => TokenizerConfig::from_env(),
        }
        .with_batch_capacity(batch_capacity)
        .and_then(TokenizerConfig::validate)
        .map_err(|err| PyValueError::new_err(err.to_string()))?;

        let mut catalog = Catalog::new();
        catalog.insert(config.table_name.clone(), words.iter().collect::<PatTable>());
        Ok(Self { catalog, config })
    }

    /// Create a tokenizer from a newline-separated word list and a JSON config
    #[staticmethod]
    #[pyo3(signature = (word_list, config_json="{}"))]
    fn from_word_list(word_list: &str, config_json: &str) -> PyResult<Self> {
        let config = TokenizerConfig::from_json(config_json)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;
        let mut catalog = Catalog::new();
        catalog.insert(config.table_name.clone(), PatTable::from_word_list(word_list));
        Ok(Self { catalog, config })
    }

    /// Tokenize text
    ///
    /// Returns:
    ///     List of Token objects covering the whole input
    fn tokenize(&self, text: &str) -> PyResult<Vec<Token>> {
        let tokens = self.tokenizer()?.tokenize(text).map_err(to_py_err)?;
        Ok(tokens.iter().map(Token::from).collect())
    }

    /// Tokenize text into a JSON array of tokens
    fn tokenize_json(&self, text: &str) -> PyResult<String> {
        let tokens = self.tokenizer()?.tokenize(text).map_err(to_py_err)?;
        serde_json::to_string(&tokens).map_err(|err| PyValueError::new_err(err.to_string()))
    }

    /// Dictionary terms found in text, in order
    #[pyo3(signature = (text, unique=false))]
    fn terms(&self, text: &str, unique: bool) -> PyResult<Vec<String>> {
        let tokenizer = self.tokenizer()?;
        let terms = if unique {
            tokenizer.terms_unique(text)
        } else {
            tokenizer.terms(text)
        }
        .map_err(to_py_err)?;
        Ok(terms.into_iter().map(str::to_string).collect())
    }

    fn __repr__(&self) -> String {
        let entries = self
            .catalog
            .get(&self.config.table_name)
            .map_or(0, |table| table.len());
        format!(
            "WhiteTokenizer(table_name='{}', entries={}, batch_capacity={})",
            self.config.table_name, entries, self.config.batch_capacity
        )
    }
}

/// Python module
#[pymodule]
fn whiteword_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<WhiteTokenizer>()?;
    m.add_class::<Token>()?;
    m.add_function(wrap_pyfunction!(init_tracing, m)?)?;
    Ok(())
}
