//! HTML views, rendered with `tera`. Templates are compiled into the binary and
//! auto-escaped (`.html` names).

use crate::error::{AdminError, AdminErrorExt};
use crate::resource::{Property, PropertyType};
use serde::Serialize;
use tera::{Context, Tera};

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../templates/base.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("list.html", include_str!("../templates/list.html")),
    ("detail.html", include_str!("../templates/detail.html")),
];

#[derive(Debug, Serialize)]
pub(crate) struct Layout {
    pub(crate) title: String,
    pub(crate) company_name: String,
    pub(crate) root_path: String,
    pub(crate) resources: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardCard {
    pub(crate) id: String,
    pub(crate) count: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct Column {
    name: String,
    is_id: bool,
}

impl From<&Property> for Column {
    fn from(property: &Property) -> Self {
        Self { name: property.name.clone(), is_id: property.is_id }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Row {
    pub(crate) id: String,
    pub(crate) cells: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DetailField {
    pub(crate) name: String,
    pub(crate) kind: PropertyType,
    pub(crate) value: String,
}

/// Position of a list page; `query` is appended to pager links.
#[derive(Debug)]
pub(crate) struct Pager {
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) total: u64,
    pub(crate) total_pages: u64,
    pub(crate) query: String,
}

#[derive(Debug, Serialize)]
struct Pagination<'a> {
    page: u32,
    per_page: u32,
    total: u64,
    total_pages: u64,
    previous: Option<u32>,
    next: Option<u32>,
    query: &'a str,
}

#[derive(Debug)]
pub(crate) struct Views {
    tera: Tera,
}

impl Views {
    pub(crate) fn new() -> Result<Self, AdminError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES).context("Compiling admin templates")?;
        Ok(Self { tera })
    }

    pub(crate) fn dashboard(&self, layout: &Layout, cards: &[DashboardCard]) -> Result<String, AdminError> {
        let mut context = base_context(layout);
        context.insert("cards", cards);
        self.render("dashboard.html", &context)
    }

    pub(crate) fn list(
        &self,
        layout: &Layout,
        resource: &str,
        columns: &[Column],
        rows: &[Row],
        pager: &Pager,
    ) -> Result<String, AdminError> {
        let page = pager.page;
        let pagination = Pagination {
            page,
            per_page: pager.per_page,
            total: pager.total,
            total_pages: pager.total_pages,
            previous: (page > 1).then(|| page - 1),
            next: (u64::from(page) < pager.total_pages).then(|| page + 1),
            query: &pager.query,
        };

        let mut context = base_context(layout);
        context.insert("resource", resource);
        context.insert("columns", columns);
        context.insert("rows", rows);
        context.insert("pagination", &pagination);
        self.render("list.html", &context)
    }

    pub(crate) fn detail(
        &self,
        layout: &Layout,
        resource: &str,
        record_id: &str,
        fields: &[DetailField],
    ) -> Result<String, AdminError> {
        let mut context = base_context(layout);
        context.insert("resource", resource);
        context.insert("record_id", record_id);
        context.insert("fields", fields);
        self.render("detail.html", &context)
    }

    fn render(&self, template: &'static str, context: &Context) -> Result<String, AdminError> {
        self.tera.render(template, context).context(template)
    }
}

fn base_context(layout: &Layout) -> Context {
    let mut context = Context::new();
    context.insert("layout", layout);
    context
}

/// Cuts `value` to `max` characters, marking the cut.
pub(crate) fn truncate(mut value: String, max: usize) -> String {
    if let Some((index, _)) = value.char_indices().nth(max) {
        value.truncate(index);
        value.push_str("...");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout {
            title: "Dashboard".into(),
            company_name: "Gantry Admin".into(),
            root_path: "/admin".into(),
            resources: vec!["tasks".into()],
        }
    }

    #[test]
    fn templates_compile() {
        assert!(Views::new().is_ok());
    }

    #[test]
    fn dashboard_lists_resources() -> Result<(), AdminError> {
        let html = Views::new()?
            .dashboard(&layout(), &[DashboardCard { id: "tasks".into(), count: 7 }])?;
        assert!(html.contains("Gantry Admin"));
        assert!(html.contains("tasks"));
        assert!(html.contains('7'));
        Ok(())
    }

    fn pager(page: u32, total_pages: u64, query: &str) -> Pager {
        Pager { page, per_page: 25, total: 1, total_pages, query: query.into() }
    }

    #[test]
    fn values_are_escaped() -> Result<(), AdminError> {
        let rows = [Row { id: "1".into(), cells: vec!["<script>alert(1)</script>".into()] }];
        let columns = [Column { name: "title".into(), is_id: false }];
        let html = Views::new()?.list(&layout(), "tasks", &columns, &rows, &pager(1, 1, "perPage=25"))?;

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        Ok(())
    }

    #[test]
    fn pager_links_carry_the_query() -> Result<(), AdminError> {
        let html = Views::new()?.list(&layout(), "tasks", &[], &[], &pager(2, 3, "perPage=25&sortBy=title"))?;

        assert!(html.contains("?page=1&amp;perPage=25&amp;sortBy=title"));
        assert!(html.contains("?page=3&amp;perPage=25&amp;sortBy=title"));
        Ok(())
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short".into(), 10), "short");
        assert_eq!(truncate("ééééé".into(), 2), "éé...");
    }
}
