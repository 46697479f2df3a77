use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    ResultEngine, SettingKey, user_settings,
    util::{normalize_commodity, normalize_tag},
};

use super::{Engine, with_tx};

/// Currency used when the user never picked one.
pub const DEFAULT_CURRENCY: &str = "EUR";

impl Engine {
    /// Read a raw setting value.
    pub async fn user_get_setting(
        &self,
        tg_chat_id: i64,
        key: SettingKey,
    ) -> ResultEngine<Option<String>> {
        let model = user_settings::Entity::find_by_id((tg_chat_id, key.as_str().to_string()))
            .one(&self.database)
            .await?;
        Ok(model.map(|m| m.value))
    }

    /// Replace a setting. `None` (or an empty value) removes it.
    ///
    /// Delete and insert run in the same DB transaction so readers never see
    /// two rows for the same key.
    pub async fn user_set_setting(
        &self,
        tg_chat_id: i64,
        key: SettingKey,
        value: Option<&str>,
    ) -> ResultEngine<()> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        with_tx!(self, |db_tx| {
            user_settings::Entity::delete_many()
                .filter(user_settings::Column::TgChatId.eq(tg_chat_id))
                .filter(user_settings::Column::Setting.eq(key.as_str()))
                .exec(&db_tx)
                .await?;
            if let Some(value) = value {
                user_settings::ActiveModel {
                    tg_chat_id: ActiveValue::Set(tg_chat_id),
                    setting: ActiveValue::Set(key.as_str().to_string()),
                    value: ActiveValue::Set(value.to_string()),
                }
                .insert(&db_tx)
                .await?;
            }
            ResultEngine::Ok(())
        })
    }

    /// Currency for new transactions, [`DEFAULT_CURRENCY`] if unset.
    pub async fn user_get_currency(&self, tg_chat_id: i64) -> ResultEngine<String> {
        Ok(self
            .user_get_setting(tg_chat_id, SettingKey::Currency)
            .await?
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
    }

    /// Store a new default currency and return the normalized value.
    pub async fn user_set_currency(&self, tg_chat_id: i64, currency: &str) -> ResultEngine<String> {
        let currency = normalize_commodity(currency)?;
        self.user_set_setting(tg_chat_id, SettingKey::Currency, Some(&currency))
            .await?;
        Ok(currency)
    }

    /// Vacation tag, if vacation mode is on.
    pub async fn user_get_tag(&self, tg_chat_id: i64) -> ResultEngine<Option<String>> {
        self.user_get_setting(tg_chat_id, SettingKey::VacationTag)
            .await
    }

    /// Turn vacation mode on with `tag`, or off with `None`. Returns the stored tag.
    pub async fn user_set_tag(
        &self,
        tg_chat_id: i64,
        tag: Option<&str>,
    ) -> ResultEngine<Option<String>> {
        let tag = tag.map(normalize_tag).transpose()?;
        self.user_set_setting(tg_chat_id, SettingKey::VacationTag, tag.as_deref())
            .await?;
        Ok(tag)
    }

    pub async fn user_is_admin(&self, tg_chat_id: i64) -> ResultEngine<bool> {
        let value = self.user_get_setting(tg_chat_id, SettingKey::IsAdmin).await?;
        Ok(matches!(
            value.as_deref().map(str::trim),
            Some("true" | "1" | "TRUE" | "True")
        ))
    }

    pub async fn user_set_admin(&self, tg_chat_id: i64, is_admin: bool) -> ResultEngine<()> {
        let value = is_admin.then_some("true");
        self.user_set_setting(tg_chat_id, SettingKey::IsAdmin, value)
            .await
    }
}
