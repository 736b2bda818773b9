use dotenv::dotenv;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;

use crate::catalog::{Recipe, RecipeIngredient};
use crate::menu::grid::{MealType, WeekDay};
use crate::menu::naming::resolve_unique_name;
use crate::menu::{MenuPatch, NewWeeklyMenu, WeeklyMenu};
use crate::nutrition::NutritionPer100;
use crate::store::session::{Session, TokenResponse};
use crate::store::StoreError;
use crate::text::normalize;

/// Environment variables holding the store endpoint and public API key.
pub const STORE_URL_ENV_VAR: &str = "SUPABASE_URL";
pub const STORE_KEY_ENV_VAR: &str = "SUPABASE_ANON_KEY";

/// An ingredient row from the shared ingredient table, macros per 100 of its
/// base unit.
#[derive(Debug, Deserialize, Clone)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub base_unit: String,
    #[serde(default)]
    pub category: String,
    #[serde(flatten)]
    pub nutrition: NutritionPer100,
}

/// A recipe about to be created or replaced; the store assigns id and owner.
#[derive(Debug, serde::Serialize, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub meal_types: Vec<MealType>,
    pub week_days: Vec<WeekDay>,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: String,
}

/// REST client for the managed backend (PostgREST rows + GoTrue auth). All
/// row operations are scoped to the session's user; the backend enforces the
/// same ownership server-side.
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        RestStore {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Builds a store from `SUPABASE_URL` / `SUPABASE_ANON_KEY`, loading a
    /// `.env` file if present.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_env_vars(STORE_URL_ENV_VAR, STORE_KEY_ENV_VAR)
    }

    /// Like [`RestStore::from_env`] with caller-chosen variable names.
    pub fn from_env_vars(url_var: &str, key_var: &str) -> Result<Self, StoreError> {
        dotenv().ok();
        let base_url =
            env::var(url_var).map_err(|_| StoreError::MissingCredential(url_var.to_string()))?;
        let api_key =
            env::var(key_var).map_err(|_| StoreError::MissingCredential(key_var.to_string()))?;
        Ok(Self::new(base_url.trim_end_matches('/').to_string(), api_key))
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn check<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(StoreError::ApiError { status, error_body })
        }
    }

    async fn check_empty(response: reqwest::Response) -> Result<(), StoreError> {
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(StoreError::ApiError { status, error_body })
        }
    }

    // --- session lifecycle ---

    /// Opens a session with email/password credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = Self::check(response).await?;
        Ok(token.into())
    }

    /// Renews the session's tokens in place.
    pub async fn refresh(&self, session: &mut Session) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.api_key)
            .json(&json!({ "refresh_token": session.refresh_token }))
            .send()
            .await?;
        let token: TokenResponse = Self::check(response).await?;
        *session = token.into();
        Ok(())
    }

    /// Closes the session; the tokens are invalid afterwards.
    pub async fn sign_out(&self, session: Session) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        Self::check_empty(response).await
    }

    // --- recipes ---

    /// All recipes owned by the session's user, newest first.
    pub async fn list_recipes(&self, session: &Session) -> Result<Vec<Recipe>, StoreError> {
        let response = self
            .client
            .get(self.rest_url("recipes"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        Self::check(response).await
    }

    /// One recipe by id, with its ingredient nutrition resolved.
    pub async fn get_recipe(&self, session: &Session, id: &str) -> Result<Recipe, StoreError> {
        let response = self
            .client
            .get(self.rest_url("recipes"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .send()
            .await?;
        let mut rows: Vec<Recipe> = Self::check(response).await?;
        rows.pop()
            .ok_or_else(|| StoreError::EmptyResponse(format!("recipe {}", id)))
    }

    pub async fn create_recipe(
        &self,
        session: &Session,
        recipe: &NewRecipe,
    ) -> Result<Recipe, StoreError> {
        let mut payload = serde_json::to_value(recipe)?;
        if let Some(object) = payload.as_object_mut() {
            object.insert("user_id".to_string(), json!(session.user_id));
        }
        let response = self
            .client
            .post(self.rest_url("recipes"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;
        let mut rows: Vec<Recipe> = Self::check(response).await?;
        rows.pop()
            .ok_or_else(|| StoreError::EmptyResponse("recipe insert".to_string()))
    }

    pub async fn update_recipe(
        &self,
        session: &Session,
        id: &str,
        recipe: &NewRecipe,
    ) -> Result<Recipe, StoreError> {
        let response = self
            .client
            .patch(self.rest_url("recipes"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .json(recipe)
            .send()
            .await?;
        let mut rows: Vec<Recipe> = Self::check(response).await?;
        rows.pop()
            .ok_or_else(|| StoreError::EmptyResponse(format!("recipe update {}", id)))
    }

    pub async fn delete_recipe(&self, session: &Session, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.rest_url("recipes"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .send()
            .await?;
        Self::check_empty(response).await
    }

    // --- weekly menus ---

    pub async fn list_menus(&self, session: &Session) -> Result<Vec<WeeklyMenu>, StoreError> {
        let response = self
            .client
            .get(self.rest_url("weekly_menus"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        Self::check(response).await
    }

    pub async fn get_menu(&self, session: &Session, id: &str) -> Result<WeeklyMenu, StoreError> {
        let response = self
            .client
            .get(self.rest_url("weekly_menus"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .send()
            .await?;
        let mut rows: Vec<WeeklyMenu> = Self::check(response).await?;
        rows.pop()
            .ok_or_else(|| StoreError::EmptyResponse(format!("menu {}", id)))
    }

    /// The user's menu names starting with `prefix`, optionally excluding the
    /// menu being edited. Case-sensitive prefix match.
    async fn menu_names_with_prefix(
        &self,
        session: &Session,
        prefix: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<String>, StoreError> {
        #[derive(Deserialize)]
        struct NameRow {
            name: String,
        }

        let mut query = vec![
            ("select", "name".to_string()),
            ("user_id", format!("eq.{}", session.user_id)),
            ("name", format!("like.{}*", prefix)),
        ];
        if let Some(id) = exclude_id {
            query.push(("id", format!("neq.{}", id)));
        }

        let response = self
            .client
            .get(self.rest_url("weekly_menus"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .query(&query)
            .send()
            .await?;
        let rows: Vec<NameRow> = Self::check(response).await?;
        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    /// The unique name the given desired name resolves to for this user. A
    /// failed probe propagates as an error; callers must not fall back to the
    /// unresolved name.
    pub async fn resolve_menu_name(
        &self,
        session: &Session,
        desired: &str,
        exclude_id: Option<&str>,
    ) -> Result<String, StoreError> {
        let existing = self.menu_names_with_prefix(session, desired, exclude_id).await?;
        let resolved = resolve_unique_name(desired, &existing);
        if resolved != desired {
            debug!("menu name '{}' resolved to '{}'", desired, resolved);
        }
        Ok(resolved)
    }

    /// Persists a new weekly menu, resolving its name first. Aborts without
    /// inserting anything if the name probe fails.
    pub async fn create_menu(
        &self,
        session: &Session,
        menu: NewWeeklyMenu,
    ) -> Result<WeeklyMenu, StoreError> {
        let resolved = self.resolve_menu_name(session, &menu.name, None).await?;

        let mut payload = serde_json::to_value(&menu)?;
        if let Some(object) = payload.as_object_mut() {
            object.insert("name".to_string(), json!(resolved));
            object.insert("user_id".to_string(), json!(session.user_id));
        }

        let response = self
            .client
            .post(self.rest_url("weekly_menus"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;
        let mut rows: Vec<WeeklyMenu> = Self::check(response).await?;
        rows.pop()
            .ok_or_else(|| StoreError::EmptyResponse("menu insert".to_string()))
    }

    /// Applies a partial update. A renamed menu gets its new name re-resolved
    /// against the user's other menus before the write; probe failure aborts
    /// the whole update.
    pub async fn update_menu(
        &self,
        session: &Session,
        id: &str,
        mut patch: MenuPatch,
    ) -> Result<WeeklyMenu, StoreError> {
        if let Some(desired) = patch.name.take() {
            patch.name = Some(self.resolve_menu_name(session, &desired, Some(id)).await?);
        }

        let response = self
            .client
            .patch(self.rest_url("weekly_menus"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .json(&patch)
            .send()
            .await?;
        let mut rows: Vec<WeeklyMenu> = Self::check(response).await?;
        rows.pop()
            .ok_or_else(|| StoreError::EmptyResponse(format!("menu update {}", id)))
    }

    pub async fn delete_menu(&self, session: &Session, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.rest_url("weekly_menus"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .send()
            .await?;
        Self::check_empty(response).await
    }

    // --- ingredient search ---

    /// Searches the shared ingredient table by normalized partial match and
    /// ranks the rows by relevance to the term.
    pub async fn search_ingredients(
        &self,
        session: &Session,
        term: &str,
    ) -> Result<Vec<Ingredient>, StoreError> {
        let normalized = normalize(term);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(self.rest_url("ingredients"))
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .query(&[
                ("select", "*".to_string()),
                ("search_name", format!("ilike.*{}*", normalized)),
                ("limit", "10".to_string()),
            ])
            .send()
            .await?;
        let mut rows: Vec<Ingredient> = Self::check(response).await?;
        rows.sort_by_key(|row| relevance(&normalize(&row.name), &normalized));
        Ok(rows)
    }
}

/// Sort key for ingredient search results, lower is better: exact match,
/// then prefix match, then earliest substring position, ties broken by
/// shorter name.
fn relevance(name_normalized: &str, term: &str) -> (u8, usize, usize) {
    if name_normalized == term {
        (0, 0, name_normalized.len())
    } else if name_normalized.starts_with(term) {
        (1, 0, name_normalized.len())
    } else {
        let position = name_normalized.find(term).unwrap_or(usize::MAX);
        (2, position, name_normalized.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_prefers_exact_then_prefix_then_position() {
        let term = "tomate";
        let mut names = vec![
            "salsa de tomate",
            "tomate frito",
            "tomate",
            "pure de tomate concentrado",
        ];
        names.sort_by_key(|name| relevance(name, term));
        assert_eq!(
            names,
            vec![
                "tomate",
                "tomate frito",
                "pure de tomate concentrado",
                "salsa de tomate",
            ]
        );
    }

    #[test]
    fn test_relevance_breaks_position_ties_by_length() {
        let term = "sal";
        // Both start at position 0 as a prefix.
        assert!(relevance("sal fina", term) < relevance("sal gorda molida", term));
    }

    #[test]
    fn test_relevance_without_match_sorts_last() {
        let term = "arroz";
        assert!(relevance("arroz bomba", term) < relevance("lentejas", term));
    }
}
