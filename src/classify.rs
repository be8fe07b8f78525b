//! Keyword heuristics for language and topic tagging.
//!
//! Both [`guess_language`] and [`classify`] lower-case the input and look
//! for keywords as plain substrings. Nothing is tokenized, so `"pago"` also
//! hits inside `"pagos"`.
//!
//! # Language
//!
//! Each language scores one point per *distinct* keyword present. The
//! highest score wins; ties go to `pt`, then `es`, then `en`. Text with no
//! keyword at all therefore comes out as `pt`.
//!
//! # Categories
//!
//! A category is assigned when any one of its keywords occurs. A document
//! may get several categories or none.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::ClassifierConfig;
use crate::models::{CategorySet, Language};

const PT_KEYWORDS: &[&str] = &[
    "você",
    "prazo",
    "boleto",
    "pix",
    "obrigado",
    "obrigada",
    "atendimento",
    "cadastro",
    "cpf",
];

const ES_KEYWORDS: &[&str] = &[
    "usted", "gracias", "pago", "precio", "horario", "soporte", "ayuda", "registro", "dni",
];

const EN_KEYWORDS: &[&str] = &[
    "you", "thanks", "price", "support", "help", "register", "payment",
];

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "pagamento/preço",
        &[
            "pix",
            "boleto",
            "cartão",
            "pagamento",
            "pago",
            "preço",
            "valor",
            "invoice",
            "payment",
            "precio",
            "pagar",
        ],
    ),
    (
        "agendamento/horário",
        &[
            "agendar",
            "marcar",
            "horário",
            "disponível",
            "agenda",
            "cita",
            "turno",
            "schedule",
            "booking",
        ],
    ),
    (
        "endereço/localização",
        &[
            "endereço",
            "local",
            "onde fica",
            "como chegar",
            "address",
            "ubicación",
            "direccion",
            "mapa",
        ],
    ),
    (
        "suporte/ajuda",
        &[
            "ajuda",
            "suporte",
            "atendimento",
            "help",
            "soporte",
            "ayuda",
            "não funciona",
            "no funciona",
            "erro",
            "error",
            "bug",
        ],
    ),
    (
        "documentos/dados",
        &[
            "cpf",
            "cnpj",
            "rg",
            "dni",
            "pasaporte",
            "passaporte",
            "documento",
            "comprovante",
            "doc",
        ],
    ),
    (
        "cadastro/acesso",
        &[
            "cadastro",
            "registrar",
            "registro",
            "login",
            "senha",
            "password",
            "acesso",
            "entrar",
            "cadastrar",
        ],
    ),
    (
        "reembolso/cancelamento",
        &[
            "reembolso",
            "estorno",
            "devolução",
            "cancelar",
            "cancelamento",
            "refund",
        ],
    ),
    (
        "prazo/entrega",
        &[
            "prazo", "entrega", "quando", "data", "deadline", "plazo", "tarde", "demora",
        ],
    ),
    (
        "mídia/arquivo",
        &[
            "áudio",
            "audio",
            "imagem",
            "foto",
            "video",
            "arquivo",
            "documento",
            "adjunto",
            "anexo",
            "media omitted",
            "multimedia omitida",
        ],
    ),
];

/// Static keyword tables, fixed once configuration is loaded.
#[derive(Debug, Clone)]
pub struct KeywordTables {
    languages: BTreeMap<Language, Vec<String>>,
    /// Kept in declaration order for display.
    categories: Vec<(String, Vec<String>)>,
}

impl Default for KeywordTables {
    fn default() -> Self {
        let owned = |kws: &[&str]| kws.iter().map(|k| k.to_string()).collect::<Vec<_>>();

        let mut languages = BTreeMap::new();
        languages.insert(Language::Pt, owned(PT_KEYWORDS));
        languages.insert(Language::Es, owned(ES_KEYWORDS));
        languages.insert(Language::En, owned(EN_KEYWORDS));

        let categories = CATEGORIES
            .iter()
            .map(|(label, kws)| (label.to_string(), owned(kws)))
            .collect();

        Self {
            languages,
            categories,
        }
    }
}

impl KeywordTables {
    /// Replace language lists and/or the whole category table.
    pub fn apply_overrides(&mut self, overrides: &ClassifierConfig) -> Result<()> {
        for (tag, keywords) in &overrides.languages {
            let lang: Language = match tag.parse() {
                Ok(l) => l,
                Err(e) => bail!("classifier.languages: {}", e),
            };
            self.languages.insert(lang, keywords.clone());
        }
        if !overrides.categories.is_empty() {
            self.categories = overrides
                .categories
                .iter()
                .map(|(label, kws)| (label.clone(), kws.clone()))
                .collect();
        }
        Ok(())
    }

    pub fn category_labels(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(label, _)| label.as_str())
    }

    pub fn categories(&self) -> &[(String, Vec<String>)] {
        &self.categories
    }

    pub fn has_category(&self, label: &str) -> bool {
        self.categories.iter().any(|(l, _)| l == label)
    }

    fn language_score(&self, lang: Language, lowered: &str) -> usize {
        self.languages
            .get(&lang)
            .map(|kws| kws.iter().filter(|k| lowered.contains(k.as_str())).count())
            .unwrap_or(0)
    }

    /// Guess the language of `text`. Always returns exactly one tag.
    pub fn guess_language(&self, text: &str) -> Language {
        let lowered = text.to_lowercase();
        let pt = self.language_score(Language::Pt, &lowered);
        let es = self.language_score(Language::Es, &lowered);
        let en = self.language_score(Language::En, &lowered);

        if pt >= es && pt >= en {
            Language::Pt
        } else if es >= en {
            Language::Es
        } else {
            Language::En
        }
    }

    /// Every category with at least one keyword present in `text`.
    pub fn classify(&self, text: &str) -> CategorySet {
        let lowered = text.to_lowercase();
        self.categories
            .iter()
            .filter(|(_, kws)| kws.iter().any(|k| lowered.contains(k.as_str())))
            .map(|(label, _)| label.clone())
            .collect()
    }
}

/// [`KeywordTables::guess_language`] with the built-in tables.
pub fn guess_language(text: &str) -> Language {
    KeywordTables::default().guess_language(text)
}

/// [`KeywordTables::classify`] with the built-in tables.
pub fn classify(text: &str) -> CategorySet {
    KeywordTables::default().classify(text)
}

/// `tsearch categories`: print every category and its keywords.
pub fn list_categories(tables: &KeywordTables) {
    println!("{:<24} KEYWORDS", "CATEGORY");
    for (label, keywords) in tables.categories() {
        println!("{:<24} {}", label, keywords.join(", "));
    }
}

/// `tsearch classify`: tag local text files without loading a corpus.
pub fn run_classify(tables: &KeywordTables, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        let lang = tables.guess_language(&text);
        let cats = tables.classify(&text);
        let cats = if cats.is_empty() {
            "-".to_string()
        } else {
            cats.into_iter().collect::<Vec<_>>().join(", ")
        };
        println!("{}\t{}\t{}", path.display(), lang, cats);
    }
    Ok(())
}
