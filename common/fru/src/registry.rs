// Licensed under the Apache-2.0 license

use crate::record::{self, RecordTemplate, TemplateMatch};

/// What the registry decided about the bytes at an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// No further record can start here.
    EndOfArea,
    /// Advance by this many bytes and classify again.
    Skip(usize),
    Record {
        template: &'a RecordTemplate,
        end_of_list: bool,
    },
}

/// Ordered multirecord templates followed by the wildcard fallback.
///
/// Templates are tried in registration order, so on a type id collision the
/// earlier registration wins. The wildcard is held apart and always tried
/// last.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<RecordTemplate>,
    fallback: RecordTemplate,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl TemplateRegistry {
    /// A registry holding only the wildcard.
    pub fn empty() -> Self {
        TemplateRegistry {
            templates: Vec::new(),
            fallback: RecordTemplate::wildcard(),
        }
    }

    /// Power supply, DC output and DC load records.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry
            .register(record::power_supply())
            .register(record::dc_output())
            .register(record::dc_load());
        registry
    }

    pub fn register(&mut self, template: RecordTemplate) -> &mut Self {
        self.templates.push(template);
        self
    }

    /// Every template in the order they are consulted, wildcard last.
    pub fn templates(&self) -> impl Iterator<Item = &RecordTemplate> {
        self.templates
            .iter()
            .chain(core::iter::once(&self.fallback))
    }

    pub fn find(&self, name: &str) -> Option<&RecordTemplate> {
        self.templates.iter().find(|t| t.name() == Some(name))
    }

    pub fn classify(&self, buffer: &[u8], offset: usize) -> Classification<'_> {
        for template in self.templates() {
            match template.match_at(buffer, offset) {
                TemplateMatch::Mismatch => continue,
                TemplateMatch::EndOfArea => return Classification::EndOfArea,
                TemplateMatch::Skip(length) => return Classification::Skip(length),
                TemplateMatch::Matched { end_of_list } => {
                    return Classification::Record {
                        template,
                        end_of_list,
                    }
                }
            }
        }
        // The wildcard never reports a mismatch.
        Classification::EndOfArea
    }
}
