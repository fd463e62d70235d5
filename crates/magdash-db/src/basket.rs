//! Basket-opener ranking through the `get_basket_opener_products` function.

use chrono::NaiveDate;
use serde::Serialize;

use magdash_core::{BasketOpenerProduct, FilterSelection};

use crate::{DbError, HostedClient};

/// Parameters of a basket-opener lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketOpenerQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub filters: FilterSelection,
}

#[derive(Debug, Serialize)]
struct RpcParams<'a> {
    start_date: String,
    end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_filter: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_group: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_view: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_statuses: Option<&'a [String]>,
}

impl<'a> RpcParams<'a> {
    fn from_query(query: &'a BasketOpenerQuery) -> Self {
        Self {
            start_date: query.from.to_string(),
            end_date: query.to.to_string(),
            store_filter: query.filters.store_scope(),
            customer_group: query.filters.customer_group.as_filter(),
            store_view: query.filters.store_view.as_filter(),
            order_statuses: query.filters.status_scope(),
        }
    }
}

/// Products that most often start a basket in the period.
///
/// `alle` segments and empty lists are left out of the call.
///
/// # Errors
///
/// Returns [`DbError`] if the call fails.
pub async fn fetch_basket_opener_products(
    client: &HostedClient,
    query: &BasketOpenerQuery,
) -> Result<Vec<BasketOpenerProduct>, DbError> {
    let params = RpcParams::from_query(query);
    tracing::debug!(?params, "basket: fetching opener products");

    let rows: Option<Vec<BasketOpenerProduct>> = client
        .rpc("get_basket_opener_products", &params)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "basket: opener fetch failed"))?;
    let rows = rows.unwrap_or_default();
    tracing::debug!(count = rows.len(), "basket: fetched opener products");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use magdash_core::{CustomerGroup, StoreView};

    use super::*;

    fn query(filters: FilterSelection) -> BasketOpenerQuery {
        BasketOpenerQuery {
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            filters,
        }
    }

    #[test]
    fn default_filters_only_send_dates() {
        let q = query(FilterSelection::default());
        let json = serde_json::to_value(RpcParams::from_query(&q)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"start_date": "2024-01-01", "end_date": "2024-06-30"})
        );
    }

    #[test]
    fn segment_filters_are_sent_when_set() {
        let q = query(FilterSelection {
            store_ids: vec!["s1".to_string()],
            store_view: StoreView::Dk,
            customer_group: CustomerGroup::Vip,
            order_statuses: vec!["complete".to_string()],
        });
        let json = serde_json::to_value(RpcParams::from_query(&q)).unwrap();
        assert_eq!(json["store_filter"], serde_json::json!(["s1"]));
        assert_eq!(json["store_view"], "dk");
        assert_eq!(json["customer_group"], "vip");
        assert_eq!(json["order_statuses"], serde_json::json!(["complete"]));
    }
}
