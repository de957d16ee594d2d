//! 採購單匯出（CSV 與分頁文字）

use ibp_core::{IbpError, PurchaseOrder, Result};

const CSV_HEADER: [&str; 5] = ["Item", "Unit", "Quantity", "Unit Cost", "Total Cost"];

/// 採購單匯出器
pub struct OrderExporter;

impl OrderExporter {
    /// 匯出 CSV：表頭、每項明細一列，最後附上明細數與總金額
    pub fn to_csv(order: &PurchaseOrder) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(CSV_HEADER).map_err(export_error)?;
        for line in &order.items {
            writer
                .write_record([
                    line.item.clone(),
                    line.unit.clone(),
                    line.quantity.to_string(),
                    line.unit_cost.to_string(),
                    line.total_cost.to_string(),
                ])
                .map_err(export_error)?;
        }
        writer
            .write_record(["Total Items:".to_string(), order.total_items.to_string()])
            .map_err(export_error)?;
        writer
            .write_record([
                "Total Order Value:".to_string(),
                order.total_order_value.to_string(),
            ])
            .map_err(export_error)?;

        let bytes = writer
            .into_inner()
            .map_err(|err| IbpError::Export(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| IbpError::Export(err.to_string()))
    }

    /// 分頁文字版：每頁一行表頭，每項明細一行，最後一頁附上合計
    pub fn to_pages(order: &PurchaseOrder, lines_per_page: usize) -> Vec<String> {
        let lines_per_page = lines_per_page.max(1);
        let title = format!("Purchase Order {} ({})", order.id, order.date.format("%Y-%m-%d %H:%M"));
        let header = format!(
            "{:<24} {:<8} {:>10} {:>12} {:>12}",
            CSV_HEADER[0], CSV_HEADER[1], CSV_HEADER[2], CSV_HEADER[3], CSV_HEADER[4]
        );

        let chunks: Vec<_> = order.items.chunks(lines_per_page).collect();
        let page_count = chunks.len().max(1);

        let mut pages: Vec<String> = (0..page_count)
            .map(|index| {
                let mut page = vec![
                    format!("{} - page {}/{}", title, index + 1, page_count),
                    header.clone(),
                ];
                if let Some(chunk) = chunks.get(index) {
                    page.extend(chunk.iter().map(|line| {
                        format!(
                            "{:<24} {:<8} {:>10} {:>12} {:>12}",
                            line.item, line.unit, line.quantity, line.unit_cost, line.total_cost
                        )
                    }));
                }
                page.join("\n")
            })
            .collect();

        if let Some(last) = pages.last_mut() {
            last.push_str(&format!(
                "\nTotal Items: {}\nTotal Order Value: {}",
                order.total_items, order.total_order_value
            ));
        }

        pages
    }
}

fn export_error(err: csv::Error) -> IbpError {
    IbpError::Export(err.to_string())
}
