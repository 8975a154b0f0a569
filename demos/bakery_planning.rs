//! 烘焙生產規劃示例
//!
//! 從上游原始資料到生產訂單提交的完整流程：
//! 正規化、彙總、拆分、物料彙總、提交與回報套用。

use rust_decimal::Decimal;
use serde_json::json;

use prodplan_calc::{AggregationScope, GroupAxis, MaterialConsolidator, OrderLineAggregator};
use prodplan_core::adapter::{self, RawInventoryRecord, RawOrder, RawRecipe};
use prodplan_session::{CreatedRecord, FailedRecord, PlanningSession, Selection, SubmissionReport};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    println!("=== 烘焙生產規劃示例 ===\n");

    // 1. 正規化上游資料（欄位命名不一致、ID 混用字串與數字）
    let raw_orders: Vec<RawOrder> = serde_json::from_value(json!([
        {
            "key": 7001,
            "Reference": "CUST-TIGER-88",
            "items": [
                { "ItemCode": "FG-BREAD-001", "ItemName": "Sourdough Loaf", "Qty": "12", "type": "finished_good" },
                { "code": "FG-CROIS-002", "Description": "Butter Croissant", "quantity": 24, "type": "finished_good" },
                { "ItemCode": "ACC-BOX-01", "ItemName": "Cake Box", "Qty": 6, "type": "accessory" }
            ]
        },
        {
            "id": "SO-7002",
            "items": [
                { "ItemCode": "FG-BREAD-001", "ItemName": "Sourdough Loaf", "Qty": 8, "type": "finished_good" },
                { "ItemCode": "FG-CAKE-003", "ItemName": "Chocolate Fudge Cake", "Qty": 3, "type": "finished_good", "inventory_item_id": 4471 }
            ]
        }
    ]))?;

    let raw_inventory: Vec<RawInventoryRecord> = serde_json::from_value(json!([
        { "ItemCode": "FG-BREAD-001", "ItemName": "Sourdough Loaf", "Division": "Bakery Items", "QtyOnHand": 5, "unit": "pcs" },
        { "ItemCode": "FG-CROIS-002", "ItemName": "Butter Croissant", "Division": "Frozen Items", "QtyOnHand": 30 },
        { "ItemCode": "FG-CAKE-003", "ItemName": "Chocolate Fudge Cake", "Division": "Cake & Pastry Items", "QtyOnHand": "1.0", "manager_item_id": 4471 }
    ]))?;

    let raw_recipes: Vec<RawRecipe> = serde_json::from_value(json!([
        {
            "id": 901, "name": "Classic Sourdough Loaf", "yield": 1, "yield_unit": "pcs",
            "ingredients": [
                { "id": 9011, "ingredient_name": "Bread Flour", "quantity_per_batch": "0.5", "unit": "kg",
                  "inventory_item": { "id": "inv-flour", "unit_cost": 2, "quantity_available": 80 } },
                { "id": 9012, "ingredient_name": "Levain Starter", "quantity_per_batch": "0.1", "unit": "kg",
                  "inventory_item": { "id": "inv-levain", "unit_cost": 6, "quantity_available": 4 } }
            ]
        },
        {
            "id": 902, "name": "Chocolate Fudge Cake", "yield": 1, "yield_unit": "pcs",
            "manager_inventory_item_id": 4471,
            "ingredients": [
                { "id": 9021, "ingredient_name": "Cake Flour", "quantity_per_batch": "0.3", "unit": "kg",
                  "inventory_item": { "id": "inv-cakeflour", "unit_cost": 3, "quantity_available": 20 } },
                { "id": 9022, "ingredient_name": "Dark Chocolate", "quantity_per_batch": "0.4", "unit": "kg",
                  "inventory_item": { "id": "inv-choc", "unit_cost": 12, "quantity_available": "1.5" } }
            ]
        }
    ]))?;

    let orders = adapter::normalize_orders(raw_orders);
    let inventory = adapter::normalize_inventory(raw_inventory);
    let recipes = adapter::normalize_recipes(raw_recipes);
    println!(
        "正規化完成: {} 張訂單，{} 筆庫存，{} 份配方\n",
        orders.len(),
        inventory.len(),
        recipes.len()
    );

    // 2. 訂單彙總（只取成品明細，同品項跨訂單合併）
    let aggregator = OrderLineAggregator::new(inventory, recipes);
    let outcome = aggregator.aggregate(&orders, &AggregationScope::All);

    println!("生產需求:");
    for requirement in outcome.requirements.values() {
        println!(
            "  - [{}] {} 訂購 {} 庫存 {} 淨需求 {} → {} ({})",
            requirement.item_code,
            requirement.item_name,
            requirement.total_ordered,
            requirement.current_stock,
            requirement.net_required,
            requirement.category.code(),
            requirement.assigned_to,
        );
    }
    for warning in &outcome.warnings {
        println!("  ! {}", warning.message);
    }
    println!();

    // 3. 建立會話並調整規劃
    let production_date = chrono::NaiveDate::from_ymd_opt(2025, 11, 21)
        .ok_or_else(|| anyhow::anyhow!("無效的生產日期"))?;
    let mut session = PlanningSession::from_aggregation(production_date, outcome)
        .with_default_shift("shift-am".to_string());

    let bread_id = session
        .requirements()
        .find(|r| r.item_code == "FG-BREAD-001")
        .map(|r| r.id)
        .ok_or_else(|| anyhow::anyhow!("找不到麵包需求"))?;
    let cake_id = session
        .requirements()
        .find(|r| r.item_code == "FG-CAKE-003")
        .map(|r| r.id)
        .ok_or_else(|| anyhow::anyhow!("找不到蛋糕需求"))?;

    // 蛋糕淨需求 2，改為生產 5 備貨
    session.set_production_quantity(cake_id, Decimal::from(5))?;

    // 麵包淨需求 15，拆成兩班生產（7 + 8）
    let mut parts = session.begin_split(bread_id)?;
    parts[1].assigned_to = "Mr. Justin".to_string();
    session.commit_split(bread_id, parts)?;
    println!("麵包需求拆分完成，蛋糕生產數量改為 5\n");

    // 4. 選取要排產的單位
    session.toggle(Selection::regular(cake_id))?;
    session.toggle(Selection::split_part(bread_id, 0))?;
    session.toggle(Selection::split_part(bread_id, 1))?;
    println!("已選取 {} 個生產單位", session.selections().len());

    // 5. 物料彙總（依負責人分組）
    let materials = session.consolidate_selected();
    println!("\n物料需求:");
    for material in &materials {
        let flag = if material.is_insufficient() { "（庫存不足）" } else { "" };
        println!(
            "  - {} 共 {} {} 成本 {}{}",
            material.name, material.total_required, material.unit, material.total_cost, flag
        );
    }
    let summary = MaterialConsolidator::summarize(&materials);
    println!(
        "合計 {} 種原料，{} 種不足，總成本 {}",
        summary.material_count, summary.insufficient_count, summary.total_cost
    );

    println!("\n各負責人用料:");
    for group in MaterialConsolidator::group(&materials, GroupAxis::Assignee) {
        println!("  [{}]", group.key);
        for material in &group.materials {
            println!("    - {} x {} {}", material.name, material.total_required, material.unit);
        }
    }

    // 6. 打包提交請求
    let request = session.build_submission()?;
    println!("\n提交 {} 筆生產訂單（{}）:", request.production_items.len(), request.date);
    for record in &request.production_items {
        println!(
            "  - {} | {} x {} → {}",
            record.record_id, record.item_name, record.production_quantity, record.assigned_to
        );
    }

    // 7. 模擬收單端回覆：晚班的部分先失敗，修正後重送
    let (created, failed): (Vec<_>, Vec<_>) = request
        .production_items
        .iter()
        .partition(|record| !record.record_id.ends_with("-split-1"));
    let report = SubmissionReport {
        created: created
            .iter()
            .enumerate()
            .map(|(index, record)| CreatedRecord {
                record_id: record.record_id.clone(),
                order_ref: Some(format!("PO-{}", 9001 + index)),
            })
            .collect(),
        failed: failed
            .iter()
            .map(|record| FailedRecord {
                record_id: record.record_id.clone(),
                message: "shift closed".to_string(),
            })
            .collect(),
    };

    let marked = session.apply_submission(&report, production_date);
    println!("\n第一輪建立 {} 筆", marked);
    if let Err(err) = report.ensure_all_created() {
        println!("部分失敗: {err}");
    }

    // 失敗的部分仍在選取中，直接重送
    let retry_request = session.build_submission()?;
    let retry_report = SubmissionReport {
        created: retry_request
            .production_items
            .iter()
            .map(|record| CreatedRecord {
                record_id: record.record_id.clone(),
                order_ref: Some("PO-9100".to_string()),
            })
            .collect(),
        failed: Vec::new(),
    };
    session.apply_submission(&retry_report, production_date);
    retry_report.ensure_all_created()?;

    println!("\n最終狀態:");
    for requirement in session.requirements() {
        println!(
            "  - {} 已建立: {}",
            requirement.item_name,
            requirement.is_fully_created()
        );
    }

    Ok(())
}
