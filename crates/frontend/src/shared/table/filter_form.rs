use super::controller::{ListView, TableController};
use super::filters::{ControlKind, FilterField, SelectSource};
use crate::shared::typeahead::{TargetTypeDescriptor, Typeahead, TypeaheadSource};
use contracts::shared::app_data::AppData;
use leptos::prelude::*;
use thaw::*;

/// Filter typeaheads have a fixed target type, no sibling role
fn typeahead_source(target_type: &str, data: &AppData) -> Option<TypeaheadSource> {
    TargetTypeDescriptor::fixed(target_type).resolve(data)
}

fn select_options<V: ListView>(view: &V, source: SelectSource) -> Vec<String> {
    view.app().with_data(|data| match source {
        SelectSource::Applications => data.applications.iter().map(|a| a.name.clone()).collect(),
        SelectSource::Priorities => data.priority_names(),
    })
}

fn control<V: ListView>(view: &V, controller: TableController<V::Row>, field: FilterField) -> AnyView {
    let name = field.name;
    let value = Signal::derive({
        let controller = controller.clone();
        move || controller.filter_value(name)
    });
    let set = Callback::new({
        let controller = controller.clone();
        move |v: String| controller.set_filter(name, v)
    });

    match field.kind {
        ControlKind::ChoiceGroup(choices) => view! {
            <div class="filter-choices">
                {choices.iter().map(|choice| {
                    let choice = *choice;
                    let id = format!("filter-{}", choice);
                    let label_for = id.clone();
                    view! {
                        <label class="form__radio-label" for=label_for>
                            <input
                                id=id
                                type="radio"
                                class="form__radio"
                                name=name
                                value=choice
                                prop:checked=move || value.get() == choice
                                on:change=move |_| set.run(choice.to_string())
                            />
                            {choice}
                        </label>
                    }
                }).collect_view()}
            </div>
        }
        .into_any(),
        ControlKind::Typeahead(target_type) => {
            let source = view.app().with_data(|d| typeahead_source(target_type, d));
            view! {
                <Typeahead
                    source=Signal::derive(move || source.clone())
                    value=value
                    on_change=set
                    placeholder=field.label
                />
            }
            .into_any()
        }
        ControlKind::Select(source) => {
            let options = select_options(view, source);
            view! {
                <select
                    class="form__select"
                    name=name
                    prop:value=move || value.get()
                    on:change=move |ev| set.run(event_target_value(&ev))
                >
                    <option value="">"All"</option>
                    {options.into_iter().map(|o| {
                        let selected = o.clone();
                        let label = o.clone();
                        view! {
                            <option value=o selected=move || value.get() == selected>{label}</option>
                        }
                    }).collect_view()}
                </select>
            }
            .into_any()
        }
        ControlKind::DateTime => view! {
            <input
                type="text"
                class="form__input"
                name=name
                placeholder="MM/DD/YYYY h:mm AM"
                prop:value=move || value.get()
                on:input=move |ev| set.run(event_target_value(&ev))
            />
        }
        .into_any(),
        ControlKind::Plain => view! {
            <input
                type="text"
                class="form__input"
                name=name
                prop:value=move || value.get()
                on:input=move |ev| set.run(event_target_value(&ev))
            />
        }
        .into_any(),
    }
}

/// `#filter-form`: one control per field, submit re-filters the table.
#[component]
pub fn FilterForm<V: ListView>(view: V, controller: TableController<V::Row>) -> impl IntoView {
    let fields = view.filter_fields();
    let controls = fields
        .iter()
        .map(|field| {
            let label = field.label;
            view! {
                <div class="filter-form__field">
                    <Label>{label}</Label>
                    {control(&view, controller.clone(), *field)}
                </div>
            }
        })
        .collect_view();

    let loading = controller.loading;
    let on_submit = {
        let view = view.clone();
        let controller = controller.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            controller.submit(&view);
        }
    };

    view! {
        <form id="filter-form" class="filter-form" on:submit=on_submit>
            {controls}
            <button type="submit" class="button button--primary" disabled=move || loading.get()>
                "Filter"
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_typeahead_uses_field_type() {
        let data = AppData::default();
        assert_eq!(
            typeahead_source("user", &data),
            Some(TypeaheadSource::Target("user".into()))
        );
        assert_eq!(
            typeahead_source("mailing_list", &data),
            Some(TypeaheadSource::Target("mailing_list".into()))
        );
        assert_eq!(typeahead_source("", &data), None);
    }
}
