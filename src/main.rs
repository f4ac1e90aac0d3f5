// src/main.rs
use std::path::PathBuf;

use iced::widget::{button, column, container, pick_list, row, text, Space};
use iced::{
    alignment::Horizontal, executor, window, Alignment, Application, Command, Element, Length, Settings, Theme,
};
use log::{error, info};
use rfd::FileDialog;

use covid_dashboard::callbacks::SELECT_BOTH_TITLE;
use covid_dashboard::charts::figure_view;
use covid_dashboard::figure::write_figures;
use covid_dashboard::ui::{filled, footer_button, styles, Styles};
use covid_dashboard::{load_data, Config, Figure, Metric, VisualizationCallback};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const METRICS: &[Metric] = &Metric::ALL;

pub fn main() -> iced::Result {
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            std::process::exit(2);
        }
    };
    info!("Reading datasets from {}", config.data_dir.display());

    CovidDashboard::run(Settings {
        window: window::Settings {
            size: (1280, 800),
            resizable: true,
            ..Default::default()
        },
        ..Settings::with_flags(config)
    })
}

enum LoadState {
    Loading,
    Loaded(VisualizationCallback),
    Failed(String),
}

struct CovidDashboard {
    is_dark_mode: bool,
    state: LoadState,
    countries: Vec<String>,
    selected_country: Option<String>,
    selected_metric: Option<Metric>,
    map_figure: Figure,
    time_series_figure: Figure,
    status: Option<String>,
}

#[derive(Debug, Clone)]
enum Message {
    DataLoaded(Result<VisualizationCallback, String>),
    CountrySelected(String),
    MetricSelected(Metric),
    ToggleTheme,
    Export,
    Exported(Result<Option<PathBuf>, String>),
}

impl Application for CovidDashboard {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = Config;

    fn new(config: Config) -> (Self, Command<Message>) {
        let dashboard = CovidDashboard {
            is_dark_mode: config.dark_mode,
            state: LoadState::Loading,
            countries: Vec::new(),
            selected_country: None,
            selected_metric: None,
            map_figure: Figure::prompt(SELECT_BOTH_TITLE),
            time_series_figure: Figure::prompt(SELECT_BOTH_TITLE),
            status: None,
        };

        (
            dashboard,
            Command::perform(
                async move {
                    load_data(config)
                        .await
                        .map(VisualizationCallback::new)
                        .map_err(|err| err.to_string())
                },
                Message::DataLoaded,
            ),
        )
    }

    fn title(&self) -> String {
        format!("COVID-19 Dashboard v{}", VERSION)
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::DataLoaded(Ok(callback)) => {
                info!("Loaded summary for {} countries", callback.summary().len());
                self.countries = callback.summary().countries().to_vec();
                self.state = LoadState::Loaded(callback);
                self.refresh();
                Command::none()
            }

            Message::DataLoaded(Err(err)) => {
                error!("Failed to load datasets: {}", err);
                self.state = LoadState::Failed(err);
                Command::none()
            }

            Message::CountrySelected(country) => {
                self.selected_country = Some(country);
                self.refresh();
                Command::none()
            }

            Message::MetricSelected(metric) => {
                self.selected_metric = Some(metric);
                self.refresh();
                Command::none()
            }

            Message::ToggleTheme => {
                self.is_dark_mode = !self.is_dark_mode;
                Command::none()
            }

            Message::Export => {
                let map = self.map_figure.clone();
                let time_series = self.time_series_figure.clone();

                Command::perform(
                    async move {
                        let path = FileDialog::new()
                            .add_filter("JSON Files", &["json"])
                            .set_file_name("covid_figures.json")
                            .save_file();

                        match path {
                            Some(path) => write_figures(&path, &map, &time_series)
                                .map(|_| Some(path))
                                .map_err(|err| err.to_string()),
                            None => Ok(None),
                        }
                    },
                    Message::Exported,
                )
            }

            Message::Exported(Ok(Some(path))) => {
                info!("Exported figures to {}", path.display());
                self.status = Some(format!("Saved figures to {}", path.display()));
                Command::none()
            }

            Message::Exported(Ok(None)) => Command::none(),

            Message::Exported(Err(err)) => {
                error!("Export failed: {}", err);
                self.status = Some(format!("Export failed: {}", err));
                Command::none()
            }
        }
    }

    fn view(&self) -> Element<Message> {
        let styles = styles(self.is_dark_mode);

        let controls = row![
            pick_list(&self.countries[..], self.selected_country.clone(), Message::CountrySelected)
                .placeholder("Select a country")
                .width(Length::Fixed(260.0)),
            pick_list(METRICS, self.selected_metric, Message::MetricSelected)
                .placeholder("Select data type")
                .width(Length::Fixed(220.0)),
        ]
        .spacing(10)
        .padding(10)
        .align_items(Alignment::Center);

        let content: Element<Message> = match &self.state {
            LoadState::Loading => notice("Loading datasets...", styles),
            LoadState::Failed(err) => notice(&format!("Could not load data: {}", err), styles),
            LoadState::Loaded(_) => {
                let country = self.selected_country.as_deref();
                row![
                    panel(figure_view(&self.map_figure, country, styles), styles),
                    panel(figure_view(&self.time_series_figure, country, styles), styles),
                ]
                .spacing(10)
                .padding(10)
                .height(Length::Fill)
                .into()
            }
        };

        let footer = row![
            text(format!("COVID-19 Dashboard v{}", VERSION))
                .size(14)
                .style(styles.footer_fg),
            Space::with_width(Length::Fixed(20.0)),
            text(self.status.clone().unwrap_or_default())
                .size(14)
                .style(styles.footer_fg),
            Space::with_width(Length::Fill),
            button(text("Export").size(16).horizontal_alignment(Horizontal::Center))
                .on_press(Message::Export)
                .style(footer_button(styles)),
            button(text("Theme").size(16).horizontal_alignment(Horizontal::Center))
                .on_press(Message::ToggleTheme)
                .style(footer_button(styles)),
        ]
        .spacing(10)
        .padding(10)
        .align_items(Alignment::Center);

        container(column![
            controls,
            content,
            container(footer).width(Length::Fill).style(filled(styles.footer_bg)),
        ])
        .width(Length::Fill)
        .height(Length::Fill)
        .style(filled(styles.bg))
        .into()
    }

    fn theme(&self) -> Theme {
        if self.is_dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl CovidDashboard {
    /// Re-runs the callback for the current selection.
    fn refresh(&mut self) {
        if let LoadState::Loaded(callback) = &self.state {
            let (map, time_series) = callback.render(
                self.selected_country.as_deref(),
                self.selected_metric.map(Metric::label),
            );
            self.map_figure = map;
            self.time_series_figure = time_series;
        }
    }
}

fn panel<'a>(content: Element<'a, Message>, styles: &Styles) -> Element<'a, Message> {
    container(content)
        .padding(10)
        .width(Length::FillPortion(1))
        .height(Length::Fill)
        .style(filled(styles.panel_bg))
        .into()
}

fn notice<'a>(message: &str, styles: &Styles) -> Element<'a, Message> {
    container(text(message).size(24).style(styles.fg).horizontal_alignment(Horizontal::Center))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .into()
}
