//! In-process store with the same semantics as the PostgreSQL schema.

use super::{duplicate, missing_refs, Store};
use crate::error::AppError;
use crate::filter::{IngredientFilter, RecipeFilter, RestaurantFilter};
use crate::model::{
    Ingredient, IngredientChanges, Recipe, RecipeChanges, Restaurant, RestaurantChanges,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

/// Join rows as (owner, member) name pairs.
type Links = BTreeSet<(String, String)>;

#[derive(Debug, Default)]
struct Tables {
    /// nome -> produttore
    ingredienti: BTreeMap<String, String>,
    ricette: BTreeSet<String>,
    /// nome -> indirizzo
    ristoranti: BTreeMap<String, String>,
    /// (ricetta, ingrediente)
    ricetta_ingredienti: Links,
    /// (ristorante, ricetta)
    ristorante_ricette: Links,
}

fn members(links: &Links, owner: &str) -> Vec<String> {
    links
        .iter()
        .filter(|(o, _)| o == owner)
        .map(|(_, m)| m.clone())
        .collect()
}

fn linked(links: &Links, owner: &str, member: &str) -> bool {
    links.contains(&(owner.to_string(), member.to_string()))
}

fn replace_members(links: &mut Links, owner: &str, new_members: &[String]) {
    links.retain(|(o, _)| o != owner);
    for m in new_members {
        links.insert((owner.to_string(), m.clone()));
    }
}

fn rename_owner(links: &mut Links, from: &str, to: &str) {
    let moved: Vec<_> = links.iter().filter(|(o, _)| o == from).cloned().collect();
    for (o, m) in moved {
        links.remove(&(o, m.clone()));
        links.insert((to.to_string(), m));
    }
}

fn rename_member(links: &mut Links, from: &str, to: &str) {
    let moved: Vec<_> = links.iter().filter(|(_, m)| m == from).cloned().collect();
    for (o, m) in moved {
        links.remove(&(o.clone(), m));
        links.insert((o, to.to_string()));
    }
}

impl Tables {
    fn recipe(&self, nome: &str) -> Recipe {
        Recipe {
            nome: nome.to_string(),
            ingredienti: members(&self.ricetta_ingredienti, nome),
        }
    }

    fn restaurant(&self, nome: &str, indirizzo: &str) -> Restaurant {
        Restaurant {
            nome: nome.to_string(),
            indirizzo: indirizzo.to_string(),
            ricette: members(&self.ristorante_ricette, nome),
        }
    }

    fn missing_ingredients(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .filter(|n| !self.ingredienti.contains_key(n.as_str()))
            .cloned()
            .collect()
    }

    fn missing_recipes(&self, names: &[String]) -> Vec<String> {
        names.iter().filter(|n| !self.ricette.contains(n.as_str())).cloned().collect()
    }

    fn ingredient_matches(&self, nome: &str, filter: &IngredientFilter) -> bool {
        if filter.nome.as_deref().is_some_and(|n| n != nome) {
            return false;
        }
        if filter.ricetta.is_none() && filter.ristorante.is_none() {
            return true;
        }
        // Both conditions must hold for the same recipe.
        self.ricetta_ingredienti
            .iter()
            .filter(|(_, ing)| ing == nome)
            .any(|(ricetta, _)| {
                filter.ricetta.as_deref().map_or(true, |r| r == ricetta)
                    && filter
                        .ristorante
                        .as_deref()
                        .map_or(true, |rs| linked(&self.ristorante_ricette, rs, ricetta))
            })
    }

    fn recipe_matches(&self, nome: &str, filter: &RecipeFilter) -> bool {
        filter.nome.as_deref().map_or(true, |n| n == nome)
            && filter
                .ristorante
                .as_deref()
                .map_or(true, |rs| linked(&self.ristorante_ricette, rs, nome))
            && filter
                .ingrediente
                .as_deref()
                .map_or(true, |ing| linked(&self.ricetta_ingredienti, nome, ing))
    }

    fn restaurant_matches(&self, nome: &str, filter: &RestaurantFilter) -> bool {
        filter.nome.as_deref().map_or(true, |n| n == nome)
            && filter
                .ricetta
                .as_deref()
                .map_or(true, |r| linked(&self.ristorante_ricette, nome, r))
    }
}

/// Store backed by ordered maps behind a `tokio` lock; iteration order is name order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_ingredients(&self, filter: &IngredientFilter) -> Result<Vec<Ingredient>, AppError> {
        let t = self.tables.read().await;
        Ok(t.ingredienti
            .iter()
            .filter(|(nome, _)| t.ingredient_matches(nome, filter))
            .map(|(nome, produttore)| Ingredient {
                nome: nome.clone(),
                produttore: produttore.clone(),
            })
            .collect())
    }

    async fn get_ingredient(&self, nome: &str) -> Result<Option<Ingredient>, AppError> {
        let t = self.tables.read().await;
        Ok(t.ingredienti.get(nome).map(|produttore| Ingredient {
            nome: nome.to_string(),
            produttore: produttore.clone(),
        }))
    }

    async fn create_ingredient(&self, new: Ingredient) -> Result<Ingredient, AppError> {
        let mut t = self.tables.write().await;
        if t.ingredienti.contains_key(&new.nome) {
            return Err(duplicate("ingrediente"));
        }
        t.ingredienti.insert(new.nome.clone(), new.produttore.clone());
        Ok(new)
    }

    async fn update_ingredient(
        &self,
        nome: &str,
        changes: IngredientChanges,
    ) -> Result<Option<Ingredient>, AppError> {
        let mut t = self.tables.write().await;
        let Some(mut produttore) = t.ingredienti.get(nome).cloned() else {
            return Ok(None);
        };
        let target = changes.nome.unwrap_or_else(|| nome.to_string());
        if target != nome && t.ingredienti.contains_key(&target) {
            return Err(duplicate("ingrediente"));
        }
        if let Some(p) = changes.produttore {
            produttore = p;
        }
        if target != nome {
            t.ingredienti.remove(nome);
            rename_member(&mut t.ricetta_ingredienti, nome, &target);
        }
        t.ingredienti.insert(target.clone(), produttore.clone());
        Ok(Some(Ingredient {
            nome: target,
            produttore,
        }))
    }

    async fn delete_ingredient(&self, nome: &str) -> Result<bool, AppError> {
        let mut t = self.tables.write().await;
        if t.ingredienti.remove(nome).is_none() {
            return Ok(false);
        }
        t.ricetta_ingredienti.retain(|(_, ing)| ing != nome);
        Ok(true)
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, AppError> {
        let t = self.tables.read().await;
        Ok(t.ricette
            .iter()
            .filter(|nome| t.recipe_matches(nome, filter))
            .map(|nome| t.recipe(nome))
            .collect())
    }

    async fn get_recipe(&self, nome: &str) -> Result<Option<Recipe>, AppError> {
        let t = self.tables.read().await;
        Ok(t.ricette.contains(nome).then(|| t.recipe(nome)))
    }

    async fn create_recipe(&self, new: Recipe) -> Result<Recipe, AppError> {
        let mut t = self.tables.write().await;
        if t.ricette.contains(&new.nome) {
            return Err(duplicate("ricetta"));
        }
        missing_refs("ingredienti", &t.missing_ingredients(&new.ingredienti))?;
        t.ricette.insert(new.nome.clone());
        replace_members(&mut t.ricetta_ingredienti, &new.nome, &new.ingredienti);
        Ok(t.recipe(&new.nome))
    }

    async fn update_recipe(&self, nome: &str, changes: RecipeChanges) -> Result<Option<Recipe>, AppError> {
        let mut t = self.tables.write().await;
        if !t.ricette.contains(nome) {
            return Ok(None);
        }
        let target = changes.nome.unwrap_or_else(|| nome.to_string());
        if target != nome && t.ricette.contains(&target) {
            return Err(duplicate("ricetta"));
        }
        if let Some(ingredienti) = &changes.ingredienti {
            missing_refs("ingredienti", &t.missing_ingredients(ingredienti))?;
        }
        if target != nome {
            t.ricette.remove(nome);
            t.ricette.insert(target.clone());
            rename_owner(&mut t.ricetta_ingredienti, nome, &target);
            rename_member(&mut t.ristorante_ricette, nome, &target);
        }
        if let Some(ingredienti) = &changes.ingredienti {
            replace_members(&mut t.ricetta_ingredienti, &target, ingredienti);
        }
        Ok(Some(t.recipe(&target)))
    }

    async fn delete_recipe(&self, nome: &str) -> Result<bool, AppError> {
        let mut t = self.tables.write().await;
        if !t.ricette.remove(nome) {
            return Ok(false);
        }
        t.ricetta_ingredienti.retain(|(r, _)| r != nome);
        t.ristorante_ricette.retain(|(_, r)| r != nome);
        Ok(true)
    }

    async fn list_restaurants(&self, filter: &RestaurantFilter) -> Result<Vec<Restaurant>, AppError> {
        let t = self.tables.read().await;
        Ok(t.ristoranti
            .iter()
            .filter(|(nome, _)| t.restaurant_matches(nome, filter))
            .map(|(nome, indirizzo)| t.restaurant(nome, indirizzo))
            .collect())
    }

    async fn get_restaurant(&self, nome: &str) -> Result<Option<Restaurant>, AppError> {
        let t = self.tables.read().await;
        Ok(t.ristoranti
            .get(nome)
            .map(|indirizzo| t.restaurant(nome, indirizzo)))
    }

    async fn create_restaurant(&self, new: Restaurant) -> Result<Restaurant, AppError> {
        let mut t = self.tables.write().await;
        if t.ristoranti.contains_key(&new.nome) {
            return Err(duplicate("ristorante"));
        }
        missing_refs("ricette", &t.missing_recipes(&new.ricette))?;
        t.ristoranti.insert(new.nome.clone(), new.indirizzo.clone());
        replace_members(&mut t.ristorante_ricette, &new.nome, &new.ricette);
        Ok(t.restaurant(&new.nome, &new.indirizzo))
    }

    async fn update_restaurant(
        &self,
        nome: &str,
        changes: RestaurantChanges,
    ) -> Result<Option<Restaurant>, AppError> {
        let mut t = self.tables.write().await;
        let Some(mut indirizzo) = t.ristoranti.get(nome).cloned() else {
            return Ok(None);
        };
        let target = changes.nome.unwrap_or_else(|| nome.to_string());
        if target != nome && t.ristoranti.contains_key(&target) {
            return Err(duplicate("ristorante"));
        }
        if let Some(ricette) = &changes.ricette {
            missing_refs("ricette", &t.missing_recipes(ricette))?;
        }
        if let Some(i) = changes.indirizzo {
            indirizzo = i;
        }
        if target != nome {
            t.ristoranti.remove(nome);
            rename_owner(&mut t.ristorante_ricette, nome, &target);
        }
        t.ristoranti.insert(target.clone(), indirizzo.clone());
        if let Some(ricette) = &changes.ricette {
            replace_members(&mut t.ristorante_ricette, &target, ricette);
        }
        Ok(Some(t.restaurant(&target, &indirizzo)))
    }

    async fn delete_restaurant(&self, nome: &str) -> Result<bool, AppError> {
        let mut t = self.tables.write().await;
        if t.ristoranti.remove(nome).is_none() {
            return Ok(false);
        }
        t.ristorante_ricette.retain(|(rs, _)| rs != nome);
        Ok(true)
    }
}
