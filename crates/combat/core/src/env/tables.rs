use std::collections::HashMap;
use std::sync::Arc;

use super::{Castable, ContentOracle, ItemDefinition, LootTable, SpawnTemplate, StatusDefinition};

/// In-memory [`ContentOracle`] keyed by name.
#[derive(Clone, Debug, Default)]
pub struct ContentTables {
    castables: HashMap<String, Castable>,
    statuses: HashMap<String, StatusDefinition>,
    items: HashMap<String, ItemDefinition>,
    loot_tables: HashMap<String, LootTable>,
    templates: HashMap<String, Arc<SpawnTemplate>>,
}

impl ContentTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_castable(&mut self, castable: Castable) {
        self.castables.insert(castable.name.clone(), castable);
    }

    pub fn insert_status(&mut self, status: StatusDefinition) {
        self.statuses.insert(status.name.clone(), status);
    }

    pub fn insert_item(&mut self, item: ItemDefinition) {
        self.items.insert(item.name.clone(), item);
    }

    pub fn insert_loot_table(&mut self, table: LootTable) {
        self.loot_tables.insert(table.name.clone(), table);
    }

    pub fn insert_template(&mut self, template: SpawnTemplate) {
        self.templates
            .insert(template.name.clone(), Arc::new(template));
    }

    pub fn with_castable(mut self, castable: Castable) -> Self {
        self.insert_castable(castable);
        self
    }

    pub fn with_status(mut self, status: StatusDefinition) -> Self {
        self.insert_status(status);
        self
    }

    pub fn with_item(mut self, item: ItemDefinition) -> Self {
        self.insert_item(item);
        self
    }

    pub fn with_loot_table(mut self, table: LootTable) -> Self {
        self.insert_loot_table(table);
        self
    }

    pub fn with_template(mut self, template: SpawnTemplate) -> Self {
        self.insert_template(template);
        self
    }
}

impl ContentOracle for ContentTables {
    fn castable(&self, name: &str) -> Option<&Castable> {
        self.castables.get(name)
    }

    fn status(&self, name: &str) -> Option<&StatusDefinition> {
        self.statuses.get(name)
    }

    fn item(&self, name: &str) -> Option<&ItemDefinition> {
        self.items.get(name)
    }

    fn loot_table(&self, name: &str) -> Option<&LootTable> {
        self.loot_tables.get(name)
    }

    fn template(&self, name: &str) -> Option<Arc<SpawnTemplate>> {
        self.templates.get(name).cloned()
    }
}
