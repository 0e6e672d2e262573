//! Renders the grid as a self-contained HTML page

use crate::catalog::{Currency, SCRYFALL_API_BASE};
use crate::error::Result;
use crate::grid::{Cell, Grid, GridColumn, GridRow};
use crate::merger::SourceStatus;
use std::fs;
use std::path::Path;

const STYLESHEET: &str = include_str!("../assets/viewer.css");
const SCRIPT: &str = include_str!("../assets/viewer.js");
const ICON_STYLESHEET: &str = "https://unpkg.com/@phosphor-icons/web@2.1.1/src/regular/style.css";

/// Page-level settings
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub title: String,
    pub catalog_base: String,
    pub currency: Currency,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: "Card Collections".to_string(),
            catalog_base: SCRYFALL_API_BASE.to_string(),
            currency: Currency::default(),
        }
    }
}

/// Escape text for use in element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Preview { name, catalog_id } => {
            let id_attr = catalog_id
                .as_deref()
                .map(|id| format!(" data-catalog-id=\"{}\"", escape_html(id)))
                .unwrap_or_default();
            format!(
                "<a href=\"#\" class=\"preview\"{}><i class=\"ph ph-eye\"></i></a>{}",
                id_attr,
                escape_html(name)
            )
        }
        Cell::Tag { class, label } => format!("<span class=\"{}\">{}</span>", class, label),
        Cell::Text(text) => escape_html(text),
    }
}

fn render_row(row: &GridRow) -> String {
    let cells: String = GridColumn::ALL
        .iter()
        .map(|&col| {
            format!(
                "<td data-search=\"{}\">{}</td>",
                escape_html(row.search_text(col)),
                render_cell(row.cell(col))
            )
        })
        .collect();
    format!("<tr class=\"{}\">{}</tr>\n", escape_html(&row.class), cells)
}

fn render_summary(grid: &Grid) -> String {
    let collection = grid.collection();
    let mut out = format!(
        "<p class=\"summary\">{} cards from {} collection(s): {}. Loaded {}.</p>\n",
        collection.row_count(),
        collection.sources.len(),
        escape_html(&collection.collectors().join(", ")),
        collection.loaded_at.format("%Y-%m-%d %H:%M UTC")
    );

    let failed: Vec<String> = collection
        .failed_sources()
        .filter_map(|o| match &o.status {
            SourceStatus::Failed { error } => Some(format!(
                "<li>{}: {}</li>",
                escape_html(&o.source.locator),
                escape_html(error)
            )),
            SourceStatus::Loaded { .. } => None,
        })
        .collect();
    if !failed.is_empty() {
        out.push_str("<ul class=\"failed-sources\">\n");
        out.push_str(&failed.join("\n"));
        out.push_str("\n</ul>\n");
    }
    out
}

/// Render the complete page. Column filters already applied to the grid
/// are carried over into the footer inputs.
pub fn render_page(grid: &Grid, options: &PageOptions) -> String {
    let headers: String = grid
        .columns()
        .iter()
        .map(|col| format!("<th>{}</th>", escape_html(col.header())))
        .collect();

    let footers: String = grid
        .columns()
        .iter()
        .map(|&col| {
            format!(
                "<th><input type=\"search\" data-column=\"{}\" \
                 placeholder=\"Search {}\" value=\"{}\"></th>",
                col.index(),
                escape_html(col.header()),
                escape_html(grid.column_search(col))
            )
        })
        .collect();

    let body: String = grid.rows().iter().map(render_row).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="{icons}">
<style>
{style}</style>
</head>
<body>
<h1>{title}</h1>
{summary}<div id="collectionTables">
<table id="collection" class="display" data-page-size="{page_size}"
  data-catalog-base="{catalog}" data-currency="{currency}" data-currency-symbol="{symbol}">
<thead><tr>{headers}</tr></thead>
<tfoot><tr>{footers}</tr></tfoot>
<tbody>
{body}</tbody>
</table>
<div class="pager">
<button type="button" data-page="prev">Previous</button>
<span class="page-info"></span>
<button type="button" data-page="next">Next</button>
</div>
</div>
<script>
{script}</script>
</body>
</html>
"#,
        title = escape_html(&options.title),
        icons = ICON_STYLESHEET,
        style = STYLESHEET,
        summary = render_summary(grid),
        page_size = grid.page_size(),
        catalog = escape_html(options.catalog_base.trim_end_matches('/')),
        currency = options.currency.code(),
        symbol = options.currency.symbol(),
        headers = headers,
        footers = footers,
        body = body,
        script = SCRIPT,
    )
}

/// Replace the page at `path` with a freshly rendered one
pub fn write_page<P: AsRef<Path>>(path: P, grid: &Grid, options: &PageOptions) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, render_page(grid, options))?;
    tracing::info!(path = %path.display(), rows = grid.rows().len(), "wrote collection page");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::{MergedCollection, SourceOutcome};
    use crate::source::{parse_source, SourceDescriptor};
    use chrono::Utc;

    fn grid() -> Grid {
        let source = SourceDescriptor::new("Manabox_Collection_Van Dijk.csv");
        let csv = "Name,Foil,Quantity,Set code,Collector number,Rarity,Binder Name,Scryfall ID\n\
            Fire // Ice,foil,1,MH2,290,uncommon,<Main>,abc-123\n\
            Island,normal,9,UNF,235,common,Lands,\n";
        let rows = parse_source(&source, csv).unwrap();
        let failed = SourceOutcome {
            source: SourceDescriptor::new("Manabox_Collection_Job.csv"),
            status: SourceStatus::Failed {
                error: "not found".to_string(),
            },
        };
        Grid::build(
            MergedCollection {
                rows,
                sources: vec![failed],
                loaded_at: Utc::now(),
            },
            25,
        )
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape_html("Thalia's"), "Thalia&#39;s");
    }

    #[test]
    fn test_page_structure() {
        let html = render_page(&grid(), &PageOptions::default());

        assert!(html.contains("<th>Collector</th><th>Name</th><th>Foil</th>"));
        assert!(html.contains("<th>#</th>"));
        assert!(html.contains("placeholder=\"Search Binder Name\""));
        assert!(html.contains("data-page-size=\"25\""));
        assert!(html.contains("data-currency-symbol=\"\u{20AC}\""));
        assert_eq!(html.matches("<tr class=\"collector-Van-Dijk\">").count(), 2);
    }

    #[test]
    fn test_cell_markup() {
        let html = render_page(&grid(), &PageOptions::default());

        assert!(html.contains(
            "<a href=\"#\" class=\"preview\" data-catalog-id=\"abc-123\">\
             <i class=\"ph ph-eye\"></i></a>Fire // Ice"
        ));
        assert!(html.contains(
            "<a href=\"#\" class=\"preview\"><i class=\"ph ph-eye\"></i></a>Island"
        ));
        assert!(html.contains("<span class=\"foil\">foil</span>"));
        assert!(html.contains("<span class=\"uncommon\">U</span>"));
        assert!(html.contains("&lt;Main&gt;"));
        assert!(!html.contains("<Main>"));
    }

    #[test]
    fn test_failed_sources_listed() {
        let html = render_page(&grid(), &PageOptions::default());
        assert!(html.contains("<li>Manabox_Collection_Job.csv: not found</li>"));
    }

    #[test]
    fn test_applied_filter_carried_into_input() {
        let mut g = grid();
        g.search_column(GridColumn::Foil, "foil");
        let html = render_page(&g, &PageOptions::default());

        assert!(html.contains("data-column=\"2\" placeholder=\"Search Foil\" value=\"foil\""));
    }

    #[test]
    fn test_write_page_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collection.html");
        fs::write(&path, "stale").unwrap();

        write_page(&path, &grid(), &PageOptions::default()).unwrap();
        let written = fs::read_to_string(&path).unwrap();

        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(!written.contains("stale"));
    }
}
