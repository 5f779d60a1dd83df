//! Daily Context Cards
//!
//! Tasks from Things 3 and the weather, shown under the overview header.
//! Mornings look ahead (today's list, the rest of today's forecast);
//! evenings look back at what got done and ahead to tomorrow's weather.
//! A source the server has switched off renders nothing.

use leptos::*;

use crate::api::{self, Context, HourlyForecast, RecentCompleted, TodayTasks};
use crate::state::{GlobalState, ReportMode};

/// How many forecast hours fit on the card
const FORECAST_HOURS: usize = 6;

#[component]
pub fn DailyContext() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let tasks = create_local_resource(
        move || state.mode.get(),
        |mode| async move {
            match mode {
                ReportMode::Morning => TaskView::Planned(api::fetch_today_tasks().await),
                ReportMode::Evening => TaskView::Done(api::fetch_recent_completed().await),
            }
        },
    );
    let weather = create_local_resource(|| (), |_| api::fetch_weather());

    view! {
        <div class="grid md:grid-cols-2 gap-4">
            <Suspense fallback=|| ()>
                {move || tasks.get().map(|view| view.render())}
            </Suspense>
            <Suspense fallback=|| ()>
                {move || weather.get().map(|report| {
                    let mode = state.mode.get();
                    render_weather(report, mode)
                })}
            </Suspense>
        </div>
    }
}

#[derive(Clone)]
enum TaskView {
    Planned(Context<TodayTasks>),
    Done(Context<RecentCompleted>),
}

impl TaskView {
    fn render(self) -> View {
        match self {
            TaskView::Planned(Context::Ready(today)) => {
                let items: Vec<(String, String)> = today
                    .areas
                    .into_iter()
                    .flat_map(|group| {
                        let name = group.name;
                        group.tasks.into_iter().map(move |task| (name.clone(), task.title))
                    })
                    .collect();
                task_card(format!("Today in Things ({})", today.total), items, "Nothing scheduled")
            }
            TaskView::Done(Context::Ready(recent)) => {
                let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
                let done = recent.days.into_iter().find(|day| day.date == today);
                let total = done.as_ref().map(|d| d.total_completed).unwrap_or(0);
                let items: Vec<(String, String)> = done
                    .map(|day| {
                        day.projects
                            .into_iter()
                            .flat_map(|group| {
                                let name = group.name;
                                group.tasks.into_iter().map(move |task| (name.clone(), task.title))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                task_card(format!("Completed today ({})", total), items, "Nothing ticked off yet")
            }
            TaskView::Planned(Context::Failed(e)) | TaskView::Done(Context::Failed(e)) => {
                unavailable("Tasks", e)
            }
            TaskView::Planned(Context::Disabled) | TaskView::Done(Context::Disabled) => {
                ().into_view()
            }
        }
    }
}

fn task_card(title: String, items: Vec<(String, String)>, empty: &'static str) -> View {
    view! {
        <section class="bg-gray-800 rounded-xl p-5">
            <h2 class="text-sm font-semibold text-gray-300 mb-3">{title}</h2>
            {if items.is_empty() {
                view! { <p class="text-sm text-gray-500">{empty}</p> }.into_view()
            } else {
                view! {
                    <ul class="space-y-1 text-sm">
                        {items
                            .into_iter()
                            .map(|(group, task)| view! {
                                <li class="flex justify-between space-x-3">
                                    <span class="text-gray-200 truncate">{task}</span>
                                    <span class="text-gray-500 shrink-0">{group}</span>
                                </li>
                            })
                            .collect_view()}
                    </ul>
                }.into_view()
            }}
        </section>
    }
    .into_view()
}

fn render_weather(report: Context<api::WeatherReport>, mode: ReportMode) -> View {
    let report = match report {
        Context::Ready(report) => report,
        Context::Disabled => return ().into_view(),
        Context::Failed(e) => return unavailable("Weather", e),
    };

    let (label, hours): (&str, Vec<HourlyForecast>) = match mode {
        ReportMode::Morning => ("Rest of today", report.today),
        ReportMode::Evening => ("Tomorrow", report.tomorrow),
    };

    view! {
        <section class="bg-gray-800 rounded-xl p-5">
            <div class="flex items-baseline justify-between mb-3">
                <h2 class="text-sm font-semibold text-gray-300">{report.location}</h2>
                <span class="text-2xl font-bold">{format!("{}°", report.current.temp)}</span>
            </div>
            <p class="text-sm text-gray-400 mb-3">
                {format!("{}, wind {:.0} km/h", report.current.description, report.current.wind_speed)}
            </p>
            <h3 class="text-xs uppercase tracking-wide text-gray-500 mb-1">{label}</h3>
            <ul class="grid grid-cols-3 gap-2 text-xs">
                {hours
                    .into_iter()
                    .take(FORECAST_HOURS)
                    .map(|hour| view! {
                        <li class="bg-gray-700 rounded-lg px-2 py-1" title=hour.description.clone()>
                            <div class="text-gray-400">{hour.time}</div>
                            <div class="text-white">{format!("{}°", hour.temp)}</div>
                            {hour.precipitation_prob.map(|p| view! {
                                <div class="text-sky-400">{format!("{:.0}%", p)}</div>
                            })}
                        </li>
                    })
                    .collect_view()}
            </ul>
        </section>
    }
    .into_view()
}

fn unavailable(what: &'static str, error: String) -> View {
    view! {
        <section class="bg-gray-800 rounded-xl p-5 text-sm text-gray-500" title=error>
            {format!("{} unavailable", what)}
        </section>
    }
    .into_view()
}
