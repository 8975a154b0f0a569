//! 訂單彙總計算
//!
//! 把多張銷售訂單的成品明細折疊為以「代碼-名稱」為鍵的生產需求表。

use std::collections::{BTreeMap, BTreeSet};

use prodplan_core::{
    InventorySnapshot, OrderLineItem, OrderSummary, ProductionRequirement, RecipeDefinition,
};

use crate::resolver::CategoryResolver;
use crate::{AggregateOutcome, PlanWarning};

/// 彙總範圍
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationScope {
    /// 全部訂單
    All,
    /// 只取指定訂單
    Orders(BTreeSet<String>),
    /// 只取指定品項鍵
    Keys(BTreeSet<String>),
}

impl AggregationScope {
    /// 指定訂單範圍
    pub fn orders<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AggregationScope::Orders(ids.into_iter().map(Into::into).collect())
    }

    /// 指定品項鍵範圍
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AggregationScope::Keys(keys.into_iter().map(Into::into).collect())
    }

    /// 檢查訂單是否在範圍內
    pub fn includes_order(&self, order_id: &str) -> bool {
        match self {
            AggregationScope::All | AggregationScope::Keys(_) => true,
            AggregationScope::Orders(ids) => ids.contains(order_id),
        }
    }

    /// 檢查品項鍵是否在範圍內
    pub fn includes_key(&self, key: &str) -> bool {
        match self {
            AggregationScope::All | AggregationScope::Orders(_) => true,
            AggregationScope::Keys(keys) => keys.contains(key),
        }
    }
}

/// 訂單彙總器
pub struct OrderLineAggregator {
    /// 庫存快照（查現有庫存與部門名）
    inventory: Vec<InventorySnapshot>,

    /// 配方定義（查成品配方）
    recipes: Vec<RecipeDefinition>,

    /// 預設班次
    default_shift_id: Option<String>,
}

impl OrderLineAggregator {
    /// 創建新的彙總器
    pub fn new(inventory: Vec<InventorySnapshot>, recipes: Vec<RecipeDefinition>) -> Self {
        Self {
            inventory,
            recipes,
            default_shift_id: None,
        }
    }

    /// 建構器模式：設置預設班次
    pub fn with_default_shift(mut self, shift_id: String) -> Self {
        self.default_shift_id = Some(shift_id);
        self
    }

    /// 主彙總入口
    pub fn aggregate(&self, orders: &[OrderSummary], scope: &AggregationScope) -> AggregateOutcome {
        tracing::info!("開始訂單彙總: {} 張訂單", orders.len());
        let start_time = std::time::Instant::now();

        let mut outcome = AggregateOutcome::empty();
        self.aggregate_into(
            &mut outcome.requirements,
            orders,
            scope,
            &mut outcome.warnings,
        );
        outcome.elapsed_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "訂單彙總完成: {} 項需求，耗時 {:?}",
            outcome.requirements.len(),
            start_time.elapsed()
        );

        outcome
    }

    /// 增量彙總：把訂單明細折疊進既有的需求表
    ///
    /// 同一品項鍵只會有一個條目，數量走累加路徑，
    /// 不會覆蓋使用者已改過的生產數量。
    pub fn aggregate_into(
        &self,
        requirements: &mut BTreeMap<String, ProductionRequirement>,
        orders: &[OrderSummary],
        scope: &AggregationScope,
        warnings: &mut Vec<PlanWarning>,
    ) {
        for order in orders {
            if !scope.includes_order(&order.id) {
                continue;
            }

            for line in order.finished_good_items() {
                let key = line.item_key();
                if !scope.includes_key(&key) {
                    continue;
                }

                let requirement = requirements
                    .entry(key)
                    .or_insert_with(|| self.seed_requirement(line, warnings));
                requirement.fold_order_line(line.quantity, &line.order_id);
            }
        }
    }

    /// 建立新的需求條目：查庫存、查配方、判定類別
    fn seed_requirement(
        &self,
        line: &OrderLineItem,
        warnings: &mut Vec<PlanWarning>,
    ) -> ProductionRequirement {
        let inventory = self.find_inventory(line);
        let recipe = self.find_recipe(line);

        if inventory.is_none() {
            tracing::debug!("品項 {} 無庫存記錄，以零庫存計", line.name);
            warnings.push(PlanWarning::info(
                line.item_key(),
                format!("找不到庫存記錄，以零庫存計: {}", line.name),
            ));
        }
        if recipe.is_none() {
            warnings.push(PlanWarning::info(
                line.item_key(),
                format!("找不到成品配方: {}", line.name),
            ));
        }

        let category = CategoryResolver::resolve(line, recipe, inventory);

        let mut requirement =
            ProductionRequirement::new(line.code.clone(), line.name.clone(), category);

        if let Some(item_id) = &line.inventory_item_id {
            requirement = requirement.with_inventory_item_id(item_id.clone());
        }
        if let Some(snapshot) = inventory {
            requirement = requirement.with_current_stock(snapshot.quantity_available);
            if requirement.inventory_item_id.is_none() {
                if let Some(item_id) = &snapshot.item_id {
                    requirement = requirement.with_inventory_item_id(item_id.clone());
                }
            }
        }
        if let Some(recipe) = recipe {
            requirement = requirement.with_recipe(recipe.clone());
        }
        if let Some(shift_id) = &self.default_shift_id {
            requirement = requirement.with_shift(shift_id.clone());
        }

        requirement
    }

    /// 以代碼或 ERP 主檔ID查找庫存快照
    fn find_inventory(&self, line: &OrderLineItem) -> Option<&InventorySnapshot> {
        self.inventory
            .iter()
            .find(|snapshot| snapshot.matches_line(line))
    }

    /// 以名稱包含或 ERP 主檔ID查找成品配方
    fn find_recipe(&self, line: &OrderLineItem) -> Option<&RecipeDefinition> {
        self.recipes.iter().find(|recipe| recipe.matches_line(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodplan_core::{ItemType, ProductionCategory};
    use rust_decimal::Decimal;

    fn line(code: &str, name: &str, quantity: i64, order_id: &str) -> OrderLineItem {
        OrderLineItem::new(
            code.to_string(),
            name.to_string(),
            Decimal::from(quantity),
            ItemType::FinishedGood,
            order_id.to_string(),
        )
    }

    fn two_bread_orders() -> Vec<OrderSummary> {
        vec![
            OrderSummary::new(
                "SO-1001".to_string(),
                vec![line("FG-BREAD-001", "Sourdough Loaf", 12, "SO-1001")],
            ),
            OrderSummary::new(
                "SO-1002".to_string(),
                vec![
                    line("FG-BREAD-001", "Sourdough Loaf", 8, "SO-1002"),
                    line("FG-CAKE-001", "Chocolate Cake", 3, "SO-1002"),
                ],
            ),
        ]
    }

    #[test]
    fn test_aggregate_merges_same_item_across_orders() {
        let aggregator = OrderLineAggregator::new(Vec::new(), Vec::new());
        let outcome = aggregator.aggregate(&two_bread_orders(), &AggregationScope::All);

        assert_eq!(outcome.requirements.len(), 2);
        assert!(outcome.elapsed_ms.is_some());

        let bread = &outcome.requirements["FG-BREAD-001-Sourdough Loaf"];
        assert_eq!(bread.total_ordered, Decimal::from(20));
        assert_eq!(bread.source_orders.len(), 2);

        // 無庫存記錄 → 淨需求等於訂購總量
        assert_eq!(bread.net_required, Decimal::from(20));
    }

    #[test]
    fn test_aggregate_skips_non_finished_goods() {
        let order = OrderSummary::new(
            "SO-2001".to_string(),
            vec![
                line("FG-BUN-01", "Butter Bun", 12, "SO-2001"),
                OrderLineItem::new(
                    "ACC-BAG-01".to_string(),
                    "Paper Bag".to_string(),
                    Decimal::from(12),
                    ItemType::Accessory,
                    "SO-2001".to_string(),
                ),
            ],
        );
        let aggregator = OrderLineAggregator::new(Vec::new(), Vec::new());
        let outcome = aggregator.aggregate(&[order], &AggregationScope::All);

        assert_eq!(outcome.requirements.len(), 1);
        assert!(outcome
            .requirements
            .contains_key("FG-BUN-01-Butter Bun"));
    }

    #[test]
    fn test_scope_orders_filters_out_other_orders() {
        let aggregator = OrderLineAggregator::new(Vec::new(), Vec::new());
        let scope = AggregationScope::orders(["SO-1001"]);
        let outcome = aggregator.aggregate(&two_bread_orders(), &scope);

        assert_eq!(outcome.requirements.len(), 1);
        let bread = &outcome.requirements["FG-BREAD-001-Sourdough Loaf"];
        assert_eq!(bread.total_ordered, Decimal::from(12));
    }

    #[test]
    fn test_scope_keys_filters_out_other_items() {
        let aggregator = OrderLineAggregator::new(Vec::new(), Vec::new());
        let scope = AggregationScope::keys(["FG-CAKE-001-Chocolate Cake"]);
        let outcome = aggregator.aggregate(&two_bread_orders(), &scope);

        assert_eq!(outcome.requirements.len(), 1);
        assert!(outcome
            .requirements
            .contains_key("FG-CAKE-001-Chocolate Cake"));
    }

    #[test]
    fn test_missing_inventory_and_recipe_produce_warnings() {
        let aggregator = OrderLineAggregator::new(Vec::new(), Vec::new());
        let orders = vec![OrderSummary::new(
            "SO-3001".to_string(),
            vec![line("FG-PIE-01", "Apple Pie", 4, "SO-3001")],
        )];
        let outcome = aggregator.aggregate(&orders, &AggregationScope::All);

        // 缺庫存 + 缺配方 = 兩則提示性警告
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome
            .warnings
            .iter()
            .all(|w| w.severity == crate::WarningSeverity::Info));
    }

    #[test]
    fn test_seed_pulls_stock_recipe_and_category() {
        let inventory = vec![InventorySnapshot::new(
            "FG-CAKE-001".to_string(),
            "Chocolate Cake".to_string(),
            Decimal::from(5),
        )
        .with_division("Cake & Pastry".to_string())];
        let recipes = vec![RecipeDefinition::new(
            "Chocolate Cake (2 pcs)".to_string(),
            Decimal::from(2),
            "pcs".to_string(),
        )];

        let aggregator = OrderLineAggregator::new(inventory, recipes)
            .with_default_shift("1".to_string());
        let orders = vec![OrderSummary::new(
            "SO-4001".to_string(),
            vec![line("FG-CAKE-001", "Chocolate Cake", 20, "SO-4001")],
        )];
        let outcome = aggregator.aggregate(&orders, &AggregationScope::All);

        let cake = &outcome.requirements["FG-CAKE-001-Chocolate Cake"];
        assert_eq!(cake.current_stock, Decimal::from(5));
        assert_eq!(cake.net_required, Decimal::from(15));
        assert_eq!(cake.category, ProductionCategory::CakePastry);
        assert_eq!(cake.assigned_to, "Mr. Rakib");
        assert_eq!(cake.shift_id, Some("1".to_string()));
        assert!(cake.recipe.is_some());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_incremental_batches_match_one_shot() {
        let aggregator = OrderLineAggregator::new(Vec::new(), Vec::new());
        let orders = two_bread_orders();

        let one_shot = aggregator.aggregate(&orders, &AggregationScope::All);

        let mut requirements = BTreeMap::new();
        let mut warnings = Vec::new();
        aggregator.aggregate_into(
            &mut requirements,
            &orders[..1],
            &AggregationScope::All,
            &mut warnings,
        );
        aggregator.aggregate_into(
            &mut requirements,
            &orders[1..],
            &AggregationScope::All,
            &mut warnings,
        );

        assert_eq!(requirements.len(), one_shot.requirements.len());
        for (key, requirement) in &requirements {
            let expected = &one_shot.requirements[key];
            assert_eq!(requirement.total_ordered, expected.total_ordered);
            assert_eq!(requirement.net_required, expected.net_required);
            assert_eq!(requirement.source_orders, expected.source_orders);
        }
    }

    #[test]
    fn test_same_input_yields_same_quantities() {
        let aggregator = OrderLineAggregator::new(Vec::new(), Vec::new());
        let orders = two_bread_orders();

        let first = aggregator.aggregate(&orders, &AggregationScope::All);
        let second = aggregator.aggregate(&orders, &AggregationScope::All);

        let first_keys: Vec<_> = first.requirements.keys().collect();
        let second_keys: Vec<_> = second.requirements.keys().collect();
        assert_eq!(first_keys, second_keys);

        for (key, requirement) in &first.requirements {
            assert_eq!(
                requirement.total_ordered,
                second.requirements[key].total_ordered
            );
        }
    }
}
