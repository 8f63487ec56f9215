/// Implement `CardService` for an adapter type by delegating to its
/// inherent `_find` / `_get` / `_patch` methods and `capabilities` field.
///
/// ```ignore
/// card_core::card_adapter!(PgContacts, Contact, ContactParams);
/// ```
#[macro_export]
macro_rules! card_adapter {
    ($ty:ty, $rec:ty, $params:ty) => {
        #[async_trait::async_trait]
        impl $crate::CardService<$rec, $params> for $ty {
            fn capabilities(&self) -> $crate::ServiceCapabilities {
                self.capabilities.clone()
            }

            async fn find(&self, params: $params) -> anyhow::Result<Vec<$rec>> {
                self._find(params).await
            }

            async fn get(&self, id: &str, params: $params) -> anyhow::Result<$rec> {
                self._get(id, params).await
            }

            async fn patch(
                &self,
                id: &str,
                data: <$rec as $crate::Record>::Changes,
                params: $params,
            ) -> anyhow::Result<$rec> {
                self._patch(id, data, params).await
            }
        }
    };
}
