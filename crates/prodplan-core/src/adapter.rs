//! 上游資料正規化
//!
//! 上游 ERP 的欄位命名並不一致（同一值可能出現在多個欄位名下，ID 可能是
//! 數字或字串）。所有後備鏈在這裡一次解決，核心其餘部分只看固定模型。

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::inventory::InventorySnapshot;
use crate::order::{ItemType, OrderLineItem, OrderSummary};
use crate::recipe::{RecipeDefinition, RecipeIngredient};
use crate::shift::{Shift, ShiftType};

/// ID 欄位可能是字串或數字，一律轉為字串
fn de_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Int(i64),
        Float(f64),
    }

    let value = Option::<IdRepr>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        IdRepr::Text(s) => s,
        IdRepr::Int(n) => n.to_string(),
        IdRepr::Float(n) => n.to_string(),
    }))
}

/// 訂單明細的原始記錄
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrderLine {
    #[serde(default, alias = "ItemCode")]
    pub code: Option<String>,

    #[serde(default, alias = "ItemName")]
    pub name: Option<String>,

    /// 部分上游以描述欄位承載品名
    #[serde(default, alias = "Description")]
    pub description: Option<String>,

    #[serde(default, alias = "Qty", alias = "qty")]
    pub quantity: Option<Decimal>,

    #[serde(default, rename = "type")]
    pub item_type: Option<String>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub inventory_item_id: Option<String>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub uuid: Option<String>,

    #[serde(default, alias = "UnitName")]
    pub unit: Option<String>,
}

impl RawOrderLine {
    /// 正規化為訂單明細，資料不完整時回傳 None
    pub fn normalize(self, order_id: &str) -> Option<OrderLineItem> {
        let name = self.name.or(self.description).unwrap_or_default();
        let code = self.code.unwrap_or_default();
        if name.is_empty() && code.is_empty() {
            return None;
        }

        let quantity = self.quantity.unwrap_or(Decimal::ZERO);
        if quantity <= Decimal::ZERO {
            return None;
        }

        let item_type = match self.item_type.as_deref() {
            Some("finished_good") => ItemType::FinishedGood,
            Some("accessory") => ItemType::Accessory,
            _ => ItemType::Other,
        };

        let mut line = OrderLineItem::new(code, name, quantity, item_type, order_id.to_string());
        if let Some(id) = self.inventory_item_id.or(self.uuid) {
            line = line.with_inventory_item_id(id);
        }
        if let Some(unit) = self.unit {
            line = line.with_unit(unit);
        }
        Some(line)
    }
}

/// 銷售訂單的原始記錄
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrder {
    #[serde(default, deserialize_with = "de_opt_id", alias = "key")]
    pub id: Option<String>,

    #[serde(default, alias = "Reference")]
    pub reference: Option<String>,

    #[serde(default)]
    pub items: Vec<RawOrderLine>,
}

impl RawOrder {
    /// 正規化為訂單摘要，缺少訂單ID時回傳 None
    pub fn normalize(self) -> Option<OrderSummary> {
        let id = self.id?;
        let items = self
            .items
            .into_iter()
            .filter_map(|line| line.normalize(&id))
            .collect();

        let mut order = OrderSummary::new(id, items);
        if let Some(reference) = self.reference {
            order = order.with_reference(reference);
        }
        Some(order)
    }
}

/// 庫存的原始記錄
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInventoryRecord {
    #[serde(default, alias = "ItemCode")]
    pub code: Option<String>,

    #[serde(default, alias = "ItemName")]
    pub name: Option<String>,

    #[serde(default, alias = "Division")]
    pub division_name: Option<String>,

    #[serde(default, alias = "QtyOnHand", alias = "qty_on_hand")]
    pub quantity_available: Option<Decimal>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub unit_cost: Option<Decimal>,

    #[serde(default, alias = "averageCost")]
    pub average_cost: Option<Decimal>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub manager_item_id: Option<String>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
}

impl RawInventoryRecord {
    /// 正規化為庫存快照，代碼與主檔ID皆缺時回傳 None
    pub fn normalize(self) -> Option<InventorySnapshot> {
        let item_id = self.manager_item_id.or(self.id);
        let code = self.code.unwrap_or_default();
        if code.is_empty() && item_id.is_none() {
            return None;
        }

        // 負庫存在模型中視為 0
        let quantity_available = self
            .quantity_available
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO);

        let mut snapshot =
            InventorySnapshot::new(code, self.name.unwrap_or_default(), quantity_available)
                .with_unit_cost(self.unit_cost.or(self.average_cost).unwrap_or(Decimal::ZERO));
        if let Some(division) = self.division_name {
            snapshot = snapshot.with_division(division);
        }
        if let Some(unit) = self.unit {
            snapshot = snapshot.with_unit(unit);
        }
        if let Some(id) = item_id {
            snapshot = snapshot.with_item_id(id);
        }
        Some(snapshot)
    }
}

/// 配方原料內嵌的庫存品項
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInventoryItemRef {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub quantity_available: Option<Decimal>,

    #[serde(default)]
    pub unit_cost: Option<Decimal>,

    #[serde(default)]
    pub unit: Option<String>,
}

/// 配方原料的原始記錄
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIngredient {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub inventory_item_id: Option<String>,

    #[serde(default)]
    pub inventory_item: Option<RawInventoryItemRef>,

    #[serde(default, alias = "ingredient_name")]
    pub name: Option<String>,

    #[serde(default, alias = "quantity_per_batch")]
    pub quantity: Option<Decimal>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub unit_cost: Option<Decimal>,

    #[serde(default)]
    pub quantity_available: Option<Decimal>,
}

impl RawIngredient {
    /// 正規化為配方原料，無任何可用識別時回傳 None
    pub fn normalize(self) -> Option<RecipeIngredient> {
        let embedded = self.inventory_item.unwrap_or_default();
        let inventory_link = embedded.id.or(self.inventory_item_id);
        let ingredient_id = self.id.or_else(|| inventory_link.clone())?;

        let name = self
            .name
            .or(embedded.name)
            .unwrap_or_else(|| "Unknown Ingredient".to_string());

        let mut ingredient = RecipeIngredient::new(
            ingredient_id,
            name,
            self.quantity.unwrap_or(Decimal::ZERO),
            self.unit.or(embedded.unit).unwrap_or_default(),
        )
        .with_unit_cost(
            embedded
                .unit_cost
                .or(self.unit_cost)
                .unwrap_or(Decimal::ZERO),
        )
        .with_available_stock(
            embedded
                .quantity_available
                .or(self.quantity_available)
                .unwrap_or(Decimal::ZERO),
        );
        if let Some(link) = inventory_link {
            ingredient = ingredient.with_inventory_item_id(link);
        }
        Some(ingredient)
    }
}

/// 配方的原始記錄
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecipe {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "category_name")]
    pub category: Option<String>,

    #[serde(default, alias = "yield")]
    pub yield_quantity: Option<Decimal>,

    #[serde(default)]
    pub yield_unit: Option<String>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub manager_inventory_item_id: Option<String>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub inventory_item_id: Option<String>,

    #[serde(default)]
    pub ingredients: Vec<RawIngredient>,
}

impl RawRecipe {
    /// 正規化為配方，缺少名稱時回傳 None
    pub fn normalize(self) -> Option<RecipeDefinition> {
        let name = self.name.filter(|n| !n.is_empty())?;

        // 產出數量必須為正，無效值一律視為 1
        let yield_quantity = match self.yield_quantity {
            Some(value) if value > Decimal::ZERO => value,
            _ => Decimal::ONE,
        };

        let mut recipe =
            RecipeDefinition::new(name, yield_quantity, self.yield_unit.unwrap_or_default());
        if let Some(id) = self.id {
            recipe = recipe.with_id(id);
        }
        if let Some(category) = self.category {
            recipe = recipe.with_category(category);
        }
        if let Some(link) = self.manager_inventory_item_id.or(self.inventory_item_id) {
            recipe = recipe.with_inventory_item_id(link);
        }

        for raw in self.ingredients {
            match raw.normalize() {
                Some(ingredient) => recipe.ingredients.push(ingredient),
                None => warn!("忽略無識別的配方原料: {}", recipe.name),
            }
        }
        Some(recipe)
    }
}

/// 班次的原始記錄
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShift {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub shift_type: Option<String>,

    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    #[serde(default)]
    pub is_active: Option<bool>,
}

/// 解析上游時刻字串（HH:MM:SS 或 HH:MM）
fn parse_shift_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

impl RawShift {
    /// 正規化為班次，缺少ID或時刻時回傳 None
    pub fn normalize(self) -> Option<Shift> {
        let id = self.id?;
        let start_time = parse_shift_time(self.start_time.as_deref()?)?;
        let end_time = parse_shift_time(self.end_time.as_deref()?)?;

        let shift_type = match self.shift_type.as_deref() {
            Some("morning") => ShiftType::Morning,
            Some("afternoon") => ShiftType::Afternoon,
            Some("evening") => ShiftType::Evening,
            Some("night") => ShiftType::Night,
            _ => ShiftType::Custom,
        };

        let name = self.name.unwrap_or_else(|| format!("Shift {}", id));
        let mut shift = Shift::new(id, name, shift_type, start_time, end_time);
        shift.is_active = self.is_active.unwrap_or(true);
        Some(shift)
    }
}

/// 批次正規化訂單，略過不完整的記錄
pub fn normalize_orders(raw: Vec<RawOrder>) -> Vec<OrderSummary> {
    raw.into_iter()
        .filter_map(|record| {
            let result = record.normalize();
            if result.is_none() {
                warn!("忽略缺少ID的訂單記錄");
            }
            result
        })
        .collect()
}

/// 批次正規化庫存
pub fn normalize_inventory(raw: Vec<RawInventoryRecord>) -> Vec<InventorySnapshot> {
    raw.into_iter()
        .filter_map(|record| {
            let result = record.normalize();
            if result.is_none() {
                warn!("忽略無代碼且無主檔ID的庫存記錄");
            }
            result
        })
        .collect()
}

/// 批次正規化配方
pub fn normalize_recipes(raw: Vec<RawRecipe>) -> Vec<RecipeDefinition> {
    raw.into_iter()
        .filter_map(|record| {
            let result = record.normalize();
            if result.is_none() {
                warn!("忽略缺少名稱的配方記錄");
            }
            result
        })
        .collect()
}

/// 批次正規化班次，全部無效時由呼叫端決定是否退回預設三班制
pub fn normalize_shifts(raw: Vec<RawShift>) -> Vec<Shift> {
    raw.into_iter()
        .filter_map(|record| {
            let result = record.normalize();
            if result.is_none() {
                warn!("忽略缺少ID或時刻的班次記錄");
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_line_field_fallbacks() {
        // 名稱落在 Description，數量是字串，ID 是數字
        let raw: RawOrderLine = serde_json::from_value(json!({
            "ItemCode": "FG-BREAD-001",
            "Description": "Sourdough Loaf",
            "Qty": "12.5",
            "type": "finished_good",
            "uuid": 4471
        }))
        .unwrap();

        let line = raw.normalize("SO-1001").unwrap();
        assert_eq!(line.code, "FG-BREAD-001");
        assert_eq!(line.name, "Sourdough Loaf");
        assert_eq!(line.quantity, Decimal::new(125, 1));
        assert_eq!(line.item_type, ItemType::FinishedGood);
        assert_eq!(line.inventory_item_id, Some("4471".to_string()));
    }

    #[test]
    fn test_order_line_rejects_zero_quantity() {
        let raw: RawOrderLine = serde_json::from_value(json!({
            "code": "FG-BREAD-001",
            "name": "Sourdough Loaf",
            "quantity": 0
        }))
        .unwrap();

        assert!(raw.normalize("SO-1001").is_none());
    }

    #[test]
    fn test_order_uses_key_as_id() {
        let raw: RawOrder = serde_json::from_value(json!({
            "key": 88,
            "items": [
                { "code": "FG-BUN-01", "name": "Butter Bun", "quantity": 6, "type": "finished_good" },
                { "quantity": 3 }
            ]
        }))
        .unwrap();

        let order = raw.normalize().unwrap();
        assert_eq!(order.id, "88");
        // 無代碼無名稱的明細被略過
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].order_id, "88");
    }

    #[test]
    fn test_inventory_division_and_cost_fallbacks() {
        let raw: RawInventoryRecord = serde_json::from_value(json!({
            "ItemCode": "FG-CAKE-02",
            "ItemName": "Chocolate Cake",
            "Division": "Cake & Pastry",
            "QtyOnHand": -3,
            "averageCost": "7.25",
            "manager_item_id": 901
        }))
        .unwrap();

        let snapshot = raw.normalize().unwrap();
        assert_eq!(snapshot.division_name, Some("Cake & Pastry".to_string()));
        // 負庫存列為 0
        assert_eq!(snapshot.quantity_available, Decimal::ZERO);
        assert_eq!(snapshot.unit_cost, Decimal::new(725, 2));
        assert_eq!(snapshot.item_id, Some("901".to_string()));
    }

    #[test]
    fn test_ingredient_identity_chain() {
        // 內嵌庫存品項的ID優先
        let embedded: RawIngredient = serde_json::from_value(json!({
            "id": 15,
            "inventory_item_id": "legacy-3",
            "inventory_item": { "id": "inv-flour", "quantity_available": 40, "unit_cost": 2 },
            "name": "Flour",
            "quantity": 0.5,
            "unit": "kg"
        }))
        .unwrap();
        let ingredient = embedded.normalize().unwrap();
        assert_eq!(ingredient.effective_id(), "inv-flour");
        assert_eq!(ingredient.available_stock, Decimal::from(40));
        assert_eq!(ingredient.unit_cost, Decimal::from(2));

        // 無內嵌時退回 inventory_item_id
        let linked: RawIngredient = serde_json::from_value(json!({
            "id": 16,
            "inventory_item_id": "inv-sugar",
            "name": "Sugar",
            "quantity": 0.2
        }))
        .unwrap();
        assert_eq!(linked.normalize().unwrap().effective_id(), "inv-sugar");

        // 全部識別缺失則略過
        let orphan: RawIngredient = serde_json::from_value(json!({
            "name": "Mystery",
            "quantity": 1
        }))
        .unwrap();
        assert!(orphan.normalize().is_none());
    }

    #[test]
    fn test_recipe_yield_defaults_to_one() {
        let raw: RawRecipe = serde_json::from_value(json!({
            "id": 7,
            "name": "Classic Sourdough",
            "yield_quantity": 0,
            "ingredients": []
        }))
        .unwrap();

        let recipe = raw.normalize().unwrap();
        assert_eq!(recipe.yield_quantity, Decimal::ONE);
        assert_eq!(recipe.id, Some("7".to_string()));
    }

    #[test]
    fn test_shift_time_formats() {
        let raw: RawShift = serde_json::from_value(json!({
            "id": 3,
            "name": "Night Shift",
            "shift_type": "night",
            "start_time": "22:00:00",
            "end_time": "06:00"
        }))
        .unwrap();

        let shift = raw.normalize().unwrap();
        assert_eq!(shift.id, "3");
        assert_eq!(shift.shift_type, ShiftType::Night);
        assert_eq!(shift.start_time, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(shift.end_time, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
    }

    #[test]
    fn test_batch_normalization_skips_bad_records() {
        let orders = normalize_orders(vec![
            serde_json::from_value(json!({ "id": "SO-1", "items": [] })).unwrap(),
            serde_json::from_value(json!({ "reference": "no-id" })).unwrap(),
        ]);
        assert_eq!(orders.len(), 1);

        let shifts = normalize_shifts(vec![
            serde_json::from_value(json!({ "id": 1, "start_time": "06:00", "end_time": "14:00" }))
                .unwrap(),
            serde_json::from_value(json!({ "id": 2, "start_time": "bad" })).unwrap(),
        ]);
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].name, "Shift 1");
    }
}
