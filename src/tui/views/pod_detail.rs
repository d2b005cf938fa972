//! Tabbed detail view for a single pod.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Tabs;

use crate::fmt::{
    FmtStyle, format_age, format_bytes, format_millicores, format_opt_bytes, now_epoch,
};
use crate::source::{
    ContainerRecord, FetchError, Filter, FilterAxis, PodDetail, ResourceKind, ResourceSource,
    SortOrder,
};
use crate::tui::style::Styles;
use crate::tui::table::{Column, Row, RowClass, TableModel};

use super::events::event_row;
use super::list::ListLayout;
use super::pods::pod_identity;
use super::{EventColumns, ResourceView, ViewKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Overview,
    Containers,
    Events,
}

impl DetailTab {
    const ALL: [DetailTab; 3] = [DetailTab::Overview, DetailTab::Containers, DetailTab::Events];

    fn index(self) -> usize {
        match self {
            DetailTab::Overview => 0,
            DetailTab::Containers => 1,
            DetailTab::Events => 2,
        }
    }

    fn title(self) -> &'static str {
        match self {
            DetailTab::Overview => "Overview",
            DetailTab::Containers => "Containers",
            DetailTab::Events => "Events",
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct PodDetailView {
    namespace: String,
    name: String,
    /// Inherited from the pod list; handed back on Back.
    filter: Filter,
    sort: SortOrder,
    paused: bool,
    tab: DetailTab,
    overview: TableModel,
    containers: TableModel,
    events: TableModel,
    rect: Rect,
}

impl PodDetailView {
    pub fn new(namespace: &str, name: &str, filter: Filter, sort: SortOrder) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            filter,
            sort,
            paused: false,
            tab: DetailTab::Overview,
            overview: TableModel::new(vec![
                Column::fixed("FIELD", 18),
                Column::overflow("VALUE", 20),
            ]),
            containers: TableModel::new(vec![
                Column::fixed("NAME", 20),
                Column::overflow("IMAGE", 24),
                Column::fixed("READY", 5),
                Column::fixed("STATE", 10),
                Column::fixed("RESTARTS", 8),
                Column::fixed("CPU", 6),
                Column::fixed("MEMORY", 7),
            ]),
            events: TableModel::new(EventColumns::columns()),
            rect: Rect::default(),
        }
    }

    pub fn tab(&self) -> DetailTab {
        self.tab
    }

    fn apply(&mut self, detail: &PodDetail, now: i64) {
        self.overview.set_rows(overview_rows(detail, now));
        self.containers
            .set_rows(detail.containers.iter().map(container_row).collect());
        self.events
            .set_rows(detail.events.iter().map(|e| event_row(e, now)).collect());
    }
}

fn kv(key: &str, value: impl Into<String>) -> Row {
    Row::new(key, vec![key.to_string(), value.into()])
}

fn overview_rows(d: &PodDetail, now: i64) -> Vec<Row> {
    let p = &d.pod;
    let mut rows = vec![
        kv("Name", p.name.clone()),
        kv("Namespace", p.namespace.clone()),
        kv("Node", p.node.clone()),
        kv("Status", p.status.clone()),
        kv("Ready", format!("{}/{}", p.ready, p.containers)),
        kv("Restarts", p.restarts.to_string()),
        kv("IP", p.ip.clone()),
        kv("Age", format_age(p.created, now, FmtStyle::Detail)),
        kv("CPU", format_millicores(p.cpu_usage_millis)),
        kv(
            "Memory",
            p.memory_usage_bytes
                .map(|b| format_bytes(b, FmtStyle::Detail))
                .unwrap_or_else(|| "-".to_string()),
        ),
        kv("QoS Class", d.qos_class.clone()),
        kv("Service Account", d.service_account.clone()),
    ];
    rows.extend(d.labels.iter().enumerate().map(|(i, (k, v))| {
        let key = if i == 0 { "Labels" } else { "" };
        Row::new(format!("label:{}", k), vec![key.to_string(), format!("{}={}", k, v)])
    }));
    rows
}

fn container_row(c: &ContainerRecord) -> Row {
    let class = if c.ready {
        RowClass::Normal
    } else {
        RowClass::Critical
    };
    Row::new(
        c.name.clone(),
        vec![
            c.name.clone(),
            c.image.clone(),
            if c.ready { "yes" } else { "no" }.to_string(),
            c.state.clone(),
            c.restarts.to_string(),
            format_millicores(c.cpu_usage_millis),
            format_opt_bytes(c.memory_usage_bytes),
        ],
    )
    .with_class(class)
}

impl ResourceView for PodDetailView {
    fn kind(&self) -> ViewKind {
        ViewKind::Detail
    }

    fn resource(&self) -> ResourceKind {
        ResourceKind::PodDetail
    }

    fn title(&self) -> String {
        format!(
            "{} {}",
            ResourceKind::PodDetail.name(),
            pod_identity(&self.namespace, &self.name)
        )
    }

    fn fetch(&mut self, source: &dyn ResourceSource) -> Result<(), FetchError> {
        let detail = source.pod_detail(&self.namespace, &self.name)?;
        self.apply(&detail, now_epoch());
        Ok(())
    }

    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
        let body = rect.height.saturating_sub(1);
        for table in [&mut self.overview, &mut self.containers, &mut self.events] {
            table.resize(rect.width, body);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        if self.rect.height == 0 {
            return;
        }
        let tabs_area = Rect::new(self.rect.x, self.rect.y, self.rect.width, 1);
        let body = Rect::new(
            self.rect.x,
            self.rect.y + 1,
            self.rect.width,
            self.rect.height - 1,
        );
        let titles = DetailTab::ALL.iter().map(|t| Line::from(t.title()));
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .style(Styles::tab_inactive())
            .highlight_style(Styles::tab_active());
        frame.render_widget(tabs, tabs_area);
        self.table().draw(frame, body);
    }

    fn table(&self) -> &TableModel {
        match self.tab {
            DetailTab::Overview => &self.overview,
            DetailTab::Containers => &self.containers,
            DetailTab::Events => &self.events,
        }
    }

    fn table_mut(&mut self) -> &mut TableModel {
        match self.tab {
            DetailTab::Overview => &mut self.overview,
            DetailTab::Containers => &mut self.containers,
            DetailTab::Events => &mut self.events,
        }
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn pause(&self) -> bool {
        self.paused
    }

    fn filter(&self) -> &Filter {
        &self.filter
    }

    fn sortorder(&self) -> SortOrder {
        self.sort
    }

    fn set_sort_and_filter(&mut self, sort: SortOrder, filter: Filter) {
        self.sort = sort;
        self.filter = filter;
    }

    fn observed_values(&self, _axis: FilterAxis) -> Vec<String> {
        Vec::new()
    }

    fn tab_next(&mut self) {
        self.tab = self.tab.next();
    }

    fn tab_prev(&mut self) {
        self.tab = self.tab.prev();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DemoSource;

    fn view() -> PodDetailView {
        let mut v = PodDetailView::new(
            "default",
            "api-7f9c6b5d8-2xkpl",
            Filter::default(),
            SortOrder::Namespace,
        );
        v.set_rect(Rect::new(0, 0, 100, 20));
        v.fetch(&DemoSource::new()).unwrap();
        v
    }

    #[test]
    fn tabs_wrap_both_ways() {
        let mut v = view();
        assert_eq!(v.tab(), DetailTab::Overview);
        v.tab_next();
        v.tab_next();
        assert_eq!(v.tab(), DetailTab::Events);
        v.tab_next();
        assert_eq!(v.tab(), DetailTab::Overview);
        v.tab_prev();
        assert_eq!(v.tab(), DetailTab::Events);
    }

    #[test]
    fn navigation_acts_on_active_tab() {
        let mut v = view();
        v.select_next();
        assert_eq!(v.selected_values().unwrap().identity, "Namespace");

        v.tab_next();
        assert_eq!(v.position(), (1, 2));
        v.select_bottom();
        assert_eq!(v.selected_values().unwrap().identity, "api-sidecar");

        // Overview selection is kept while another tab is active.
        v.tab_prev();
        assert_eq!(v.selected_values().unwrap().identity, "Namespace");
    }

    #[test]
    fn overview_lists_labels() {
        let v = view();
        let labels: Vec<&Row> = v
            .overview
            .rows()
            .iter()
            .filter(|r| r.identity.starts_with("label:"))
            .collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].fields, vec!["Labels".to_string(), "app=api".to_string()]);
    }

    #[test]
    fn missing_pod_is_an_error() {
        let mut v = PodDetailView::new("default", "gone", Filter::default(), SortOrder::Name);
        assert!(matches!(
            v.fetch(&DemoSource::new()),
            Err(FetchError::NotFound(_))
        ));
        assert_eq!(v.position(), (0, 0));
        assert_eq!(v.title(), "POD default/gone");
    }
}
