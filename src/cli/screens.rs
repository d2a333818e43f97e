//! One screen per funnel step, plus the review and confirmation views.
//!
//! Each step is a list of fields. Backing out of the first field moves to the
//! previous step; finishing the last field tries to advance.

use std::path::Path;

use crate::catalog::{OptionItem, VehicleCatalog};
use crate::cli::io::confirm_action;
use crate::cli::output;
use crate::cli::ui::banner::Banner;
use crate::cli::ui::combo::{combo_input, ComboOption, ComboPromptResult, ComboState};
use crate::cli::ui::formatting::Formatter;
use crate::cli::ui::menu_renderer::MenuUIItem;
use crate::cli::ui::prompts::{choice_menu, text_input, ChoicePromptResult, TextPromptResult};
use crate::cli::{CliError, Session};
use crate::core::photos::load_photo;
use crate::core::steps::Step;
use crate::core::wizard::Submission;
use crate::domain::{present, FunnelData, Service};
use crate::errors::FunnelError;

const CONTINUE_KEY: &str = "__CONTINUE";
const EXIT_KEY: &str = "__EXIT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Advance,
    Back,
    Exit,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldFlow {
    Next,
    Previous,
    Exit,
}

type Field = fn(&mut Session) -> Result<FieldFlow, CliError>;

pub(crate) fn run_funnel(session: &mut Session) -> Result<(), CliError> {
    if *session.wizard.data() != FunnelData::default() {
        output::info("Welcome back! Your previous answers were restored.");
    }

    loop {
        let step = session.wizard.step();
        output::blank_line();
        output::section(Banner::progress(step));

        let flow = match step {
            Step::Service => service_step(session)?,
            Step::Vehicle => run_fields(session, &[year_field, make_field, model_field])?,
            Step::Package => {
                let fields = package_fields(session.wizard.data().service);
                run_fields(session, &fields)?
            }
            Step::ConditionTiming => {
                let mut fields: Vec<Field> = vec![condition_field, timing_field];
                if session.config.features.photo_upload {
                    fields.push(photos_field);
                }
                run_fields(session, &fields)?
            }
            Step::Contact => contact_step(session)?,
        };

        match flow {
            Flow::Advance => {
                session.wizard.next();
            }
            Flow::Back => {
                session.wizard.back();
            }
            Flow::Restart => {
                session.wizard.reset();
                output::info("Starting a new quote.");
            }
            Flow::Exit => {
                if confirm_action("Leave now? Your answers are saved for next time.", true)? {
                    output::info("See you soon.");
                    return Ok(());
                }
            }
        }
    }
}

fn run_fields(session: &mut Session, fields: &[Field]) -> Result<Flow, CliError> {
    let mut index = 0;
    loop {
        if index == fields.len() {
            match session.wizard.blocking_reason() {
                None => return Ok(Flow::Advance),
                Some(reason) => {
                    output::warning(reason);
                    index = 0;
                    continue;
                }
            }
        }

        match fields[index](session)? {
            FieldFlow::Next => index += 1,
            FieldFlow::Previous if index == 0 => return Ok(Flow::Back),
            FieldFlow::Previous => index -= 1,
            FieldFlow::Exit => return Ok(Flow::Exit),
        }
    }
}

fn service_step(session: &mut Session) -> Result<Flow, CliError> {
    let mut items: Vec<MenuUIItem> = Service::ALL
        .iter()
        .map(|service| {
            let (label, blurb) = service.card();
            MenuUIItem::new(service.id(), label, blurb)
        })
        .collect();
    items.push(MenuUIItem::new(EXIT_KEY, "Exit", "Save your answers and leave"));

    let current = session.wizard.data().service.map(Service::id);
    match choice_menu(Step::Service.title(), "", items, current, false)? {
        ChoicePromptResult::Value(key) => match Service::from_id(&key) {
            Some(service) => {
                session.wizard.select_service(service);
                Ok(Flow::Advance)
            }
            None => Ok(Flow::Exit),
        },
        ChoicePromptResult::Back | ChoicePromptResult::Cancel => Ok(Flow::Exit),
    }
}

fn year_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let options = VehicleCatalog::years()
        .into_iter()
        .map(ComboOption::plain)
        .collect();
    let mut state = ComboState::new(options, false);
    let current = session.wizard.data().year.clone();
    match combo_input("Year", &mut state, current.as_deref())? {
        ComboPromptResult::Value(year) => {
            session.wizard.set_year(year);
            Ok(FieldFlow::Next)
        }
        other => Ok(combo_flow(other)),
    }
}

fn make_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let options = session
        .vehicles
        .makes()
        .into_iter()
        .map(ComboOption::plain)
        .collect();
    let mut state = ComboState::new(options, true).with_validator(Box::new(validate_free_text));
    let current = session.wizard.data().make.clone();
    match combo_input("Make", &mut state, current.as_deref())? {
        ComboPromptResult::Value(make) => {
            session.wizard.set_make(make);
            Ok(FieldFlow::Next)
        }
        other => Ok(combo_flow(other)),
    }
}

fn model_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let data = session.wizard.data();
    let options = session
        .vehicles
        .models_for(
            data.year.as_deref().unwrap_or_default(),
            data.make.as_deref().unwrap_or_default(),
        )
        .into_iter()
        .map(ComboOption::plain)
        .collect();
    let current = data.model.clone();
    let mut state = ComboState::new(options, true).with_validator(Box::new(validate_free_text));
    match combo_input("Model", &mut state, current.as_deref())? {
        ComboPromptResult::Value(model) => {
            session.wizard.set_model(model);
            Ok(FieldFlow::Next)
        }
        other => Ok(combo_flow(other)),
    }
}

fn validate_free_text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.chars().count() > 40 {
        Some("Keep it under 40 characters".to_string())
    } else if !value.chars().any(char::is_alphanumeric) {
        Some("Enter at least one letter or digit".to_string())
    } else {
        None
    }
}

fn combo_flow(result: ComboPromptResult) -> FieldFlow {
    match result {
        ComboPromptResult::Back => FieldFlow::Previous,
        ComboPromptResult::Cancel => FieldFlow::Exit,
        ComboPromptResult::Keep | ComboPromptResult::Value(_) => FieldFlow::Next,
    }
}

fn package_fields(service: Option<Service>) -> Vec<Field> {
    match service {
        Some(Service::Wrapping) => vec![package_field, finish_field, color_idea_field],
        Some(Service::Ppf) => vec![package_field, brand_field],
        Some(Service::Detailing) => vec![package_field, addons_field],
        None => vec![package_field],
    }
}

fn option_items(options: &[OptionItem]) -> Vec<MenuUIItem> {
    options
        .iter()
        .map(|item| MenuUIItem::new(item.id.as_str(), item.name.as_str(), item.description.as_str()))
        .collect()
}

fn pick_option(
    title: &str,
    options: &[OptionItem],
    current: Option<&str>,
) -> Result<Result<String, FieldFlow>, CliError> {
    Ok(match choice_menu(title, "", option_items(options), current, true)? {
        ChoicePromptResult::Value(key) => Ok(key),
        ChoicePromptResult::Back => Err(FieldFlow::Previous),
        ChoicePromptResult::Cancel => Err(FieldFlow::Exit),
    })
}

fn package_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let Some(service) = session.wizard.data().service else {
        output::warning("Select a service to continue");
        return Ok(FieldFlow::Previous);
    };
    let Some(options) = session.services.options_for(service) else {
        return Err(FunnelError::Config(format!("no packages configured for {}", service.id())).into());
    };
    let title = format!("{} packages", service.display_name());
    let current = session.wizard.data().package.clone();
    match pick_option(&title, options.packages(), current.as_deref())? {
        Ok(package) => {
            session.wizard.select_package(&package);
            Ok(FieldFlow::Next)
        }
        Err(flow) => Ok(flow),
    }
}

fn finish_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let finishes = session
        .wizard
        .data()
        .service
        .and_then(|service| session.services.options_for(service))
        .and_then(|options| options.finishes())
        .map(<[OptionItem]>::to_vec)
        .unwrap_or_default();
    let current = session.wizard.data().finish.clone();
    match pick_option("Finish", &finishes, current.as_deref())? {
        Ok(finish) => {
            session.wizard.select_finish(&finish);
            Ok(FieldFlow::Next)
        }
        Err(flow) => Ok(flow),
    }
}

fn brand_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let brands = session
        .wizard
        .data()
        .service
        .and_then(|service| session.services.options_for(service))
        .and_then(|options| options.brands())
        .map(<[OptionItem]>::to_vec)
        .unwrap_or_default();
    let current = session.wizard.data().brand.clone();
    match pick_option("Film brand", &brands, current.as_deref())? {
        Ok(brand) => {
            session.wizard.select_brand(&brand);
            Ok(FieldFlow::Next)
        }
        Err(flow) => Ok(flow),
    }
}

fn color_idea_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let current = session.wizard.data().color_idea.clone();
    loop {
        match text_input("Color idea (optional)", current.as_deref())? {
            TextPromptResult::Value(idea) => {
                session.wizard.set_color_idea(idea);
                return Ok(FieldFlow::Next);
            }
            TextPromptResult::Keep => return Ok(FieldFlow::Next),
            TextPromptResult::Back => return Ok(FieldFlow::Previous),
            TextPromptResult::Cancel => return Ok(FieldFlow::Exit),
            TextPromptResult::Help => {
                output::info("Describe a color or effect, e.g. \"Nardo grey\". Leave blank to skip.")
            }
        }
    }
}

fn addons_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let addons = session
        .wizard
        .data()
        .service
        .and_then(|service| session.services.options_for(service))
        .and_then(|options| options.addons())
        .map(<[OptionItem]>::to_vec)
        .unwrap_or_default();
    let mut last: Option<String> = None;

    loop {
        let selected = &session.wizard.data().addons;
        let mut items = vec![MenuUIItem::new(
            CONTINUE_KEY,
            "Continue",
            format!("{} add-on(s) selected", selected.len()),
        )];
        items.extend(addons.iter().map(|item| {
            let mark = if selected.contains(&item.id) { "[x]" } else { "[ ]" };
            MenuUIItem::new(
                item.id.as_str(),
                format!("{mark} {}", item.name),
                item.description.as_str(),
            )
        }));

        match choice_menu("Add-ons", "Toggle extras, then continue", items, last.as_deref(), true)? {
            ChoicePromptResult::Value(key) if key == CONTINUE_KEY => return Ok(FieldFlow::Next),
            ChoicePromptResult::Value(key) => {
                session.wizard.toggle_addon(&key);
                last = Some(key);
            }
            ChoicePromptResult::Back => return Ok(FieldFlow::Previous),
            ChoicePromptResult::Cancel => return Ok(FieldFlow::Exit),
        }
    }
}

fn condition_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let conditions = session.services.conditions.clone();
    let current = session.wizard.data().condition.clone();
    match pick_option("Vehicle condition", &conditions, current.as_deref())? {
        Ok(condition) => {
            session.wizard.select_condition(&condition);
            Ok(FieldFlow::Next)
        }
        Err(flow) => Ok(flow),
    }
}

fn timing_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let timing = session.services.timing.clone();
    let current = session.wizard.data().timing.clone();
    match pick_option("When do you need it?", &timing, current.as_deref())? {
        Ok(choice) => {
            session.wizard.select_timing(&choice);
            Ok(FieldFlow::Next)
        }
        Err(flow) => Ok(flow),
    }
}

fn photos_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    loop {
        let photos = &session.wizard.data().photos;
        let slots = session.wizard.photo_slots_left();
        let mut items = vec![MenuUIItem::new(
            CONTINUE_KEY,
            "Continue",
            format!("{} photo(s) attached", photos.len()),
        )];
        if slots > 0 {
            items.push(MenuUIItem::new(
                "attach",
                "Attach a photo",
                format!("{slots} slot(s) left"),
            ));
        }
        if let Some(last) = photos.last() {
            items.push(MenuUIItem::new(
                "remove",
                "Remove last photo",
                last.file_name.as_str(),
            ));
        }

        match choice_menu("Photos (optional)", "", items, None, true)? {
            ChoicePromptResult::Value(key) => match key.as_str() {
                "attach" => attach_photo(session)?,
                "remove" => {
                    let last = session.wizard.data().photos.len().saturating_sub(1);
                    if let Some(photo) = session.wizard.remove_photo(last) {
                        output::info(format!("Removed {}", photo.file_name));
                    }
                }
                _ => return Ok(FieldFlow::Next),
            },
            ChoicePromptResult::Back => return Ok(FieldFlow::Previous),
            ChoicePromptResult::Cancel => return Ok(FieldFlow::Exit),
        }
    }
}

fn attach_photo(session: &mut Session) -> Result<(), CliError> {
    let TextPromptResult::Value(raw) = text_input("Photo path", None)? else {
        return Ok(());
    };
    if raw.is_empty() {
        return Ok(());
    }

    match load_photo(Path::new(&raw), session.config.photo_settings()) {
        Ok(photo) => {
            let name = photo.file_name.clone();
            match session.wizard.add_photo(photo) {
                Ok(()) => output::success(format!("Attached {name}")),
                Err(err) => output::warning(err),
            }
        }
        Err(err) => output::warning(format!("Could not read {raw}: {err}")),
    }
    Ok(())
}

fn contact_step(session: &mut Session) -> Result<Flow, CliError> {
    let fields: [Field; 2] = [name_field, phone_field];
    let mut index = 0;
    loop {
        if index == fields.len() {
            match review(session)? {
                Some(flow) => return Ok(flow),
                None => {
                    index -= 1;
                    continue;
                }
            }
        }
        match fields[index](session)? {
            FieldFlow::Next => index += 1,
            FieldFlow::Previous if index == 0 => return Ok(Flow::Back),
            FieldFlow::Previous => index -= 1,
            FieldFlow::Exit => return Ok(Flow::Exit),
        }
    }
}

fn name_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    let current = session.wizard.data().name.clone();
    loop {
        match text_input("Your name", current.as_deref())? {
            TextPromptResult::Value(name) if name.is_empty() => {
                output::warning("Enter your name to continue");
            }
            TextPromptResult::Value(name) => {
                session.wizard.set_name(name);
                return Ok(FieldFlow::Next);
            }
            TextPromptResult::Keep => return Ok(FieldFlow::Next),
            TextPromptResult::Back => return Ok(FieldFlow::Previous),
            TextPromptResult::Cancel => return Ok(FieldFlow::Exit),
            TextPromptResult::Help => output::info("We use your name to greet you on WhatsApp."),
        }
    }
}

fn phone_field(session: &mut Session) -> Result<FieldFlow, CliError> {
    loop {
        let current = session.wizard.data().phone.clone();
        match text_input("WhatsApp number (optional)", current.as_deref())? {
            TextPromptResult::Value(raw) => match session.wizard.set_phone(&raw) {
                Ok(()) => return Ok(FieldFlow::Next),
                Err(FunnelError::InvalidInput(reason)) => output::warning(reason),
                Err(err) => return Err(err.into()),
            },
            TextPromptResult::Keep => return Ok(FieldFlow::Next),
            TextPromptResult::Back => return Ok(FieldFlow::Previous),
            TextPromptResult::Cancel => return Ok(FieldFlow::Exit),
            TextPromptResult::Help => output::info(format!(
                "Local numbers get +{} added. Leave blank to skip.",
                session.wizard.settings().calling_code
            )),
        }
    }
}

/// `None` sends the user back to the last contact field.
fn review(session: &mut Session) -> Result<Option<Flow>, CliError> {
    let summary = summary_block(session);
    let items = vec![
        MenuUIItem::new("send", "Send via WhatsApp", "Opens WhatsApp with your details prefilled"),
        MenuUIItem::new(EXIT_KEY, "Save and exit", "Finish later from this point"),
    ];

    match choice_menu("Review your request", &summary, items, None, true)? {
        ChoicePromptResult::Value(key) if key == "send" => {
            match session.wizard.submit(session.opener.as_ref()) {
                Ok(submission) => confirmation(session, &submission).map(Some),
                Err(FunnelError::Incomplete(reason)) => {
                    output::warning(reason);
                    Ok(None)
                }
                Err(err) => Err(err.into()),
            }
        }
        ChoicePromptResult::Value(_) | ChoicePromptResult::Cancel => Ok(Some(Flow::Exit)),
        ChoicePromptResult::Back => Ok(None),
    }
}

fn summary_block(session: &Session) -> String {
    let data = session.wizard.data();
    let services = &session.services;
    let options = data.service.and_then(|service| services.options_for(service));
    let name_in = |items: Option<&[OptionItem]>, id: Option<&str>| -> String {
        let Some(id) = id else {
            return "-".to_string();
        };
        items
            .and_then(|items| items.iter().find(|item| item.id == id))
            .map_or_else(|| id.to_string(), |item| item.name.clone())
    };

    let mut entries: Vec<(&str, String)> = vec![
        (
            "Service",
            data.service
                .map_or_else(|| "-".to_string(), |service| service.display_name().to_string()),
        ),
        ("Vehicle", data.vehicle_label().unwrap_or_else(|| "-".to_string())),
        (
            "Package",
            name_in(options.map(|options| options.packages()), present(&data.package)),
        ),
    ];
    match data.service {
        Some(Service::Wrapping) => {
            entries.push((
                "Finish",
                name_in(options.and_then(|options| options.finishes()), present(&data.finish)),
            ));
            if let Some(idea) = present(&data.color_idea) {
                entries.push(("Color idea", idea.to_string()));
            }
        }
        Some(Service::Ppf) => entries.push((
            "Brand",
            name_in(options.and_then(|options| options.brands()), present(&data.brand)),
        )),
        Some(Service::Detailing) => {
            let addons = options.and_then(|options| options.addons());
            let names: Vec<String> = data
                .addons
                .iter()
                .map(|id| name_in(addons, Some(id.as_str())))
                .collect();
            entries.push((
                "Add-ons",
                if names.is_empty() { "-".to_string() } else { names.join(", ") },
            ));
        }
        None => {}
    }
    entries.push((
        "Condition",
        name_in(Some(services.conditions.as_slice()), present(&data.condition)),
    ));
    entries.push(("Timing", name_in(Some(services.timing.as_slice()), present(&data.timing))));
    entries.push(("Name", present(&data.name).unwrap_or("-").to_string()));
    entries.push(("WhatsApp", present(&data.phone).unwrap_or("-").to_string()));
    if !data.photos.is_empty() {
        entries.push(("Photos", data.photos.len().to_string()));
    }

    Formatter::new().key_value_block(&entries)
}

fn confirmation(session: &Session, submission: &Submission) -> Result<Flow, CliError> {
    output::blank_line();
    if submission.opened && session.config.features.open_links {
        output::success("WhatsApp Opened!");
        output::info("Send the prefilled message and we will reply with your quote.");
    } else {
        output::warning("Open this link to send your request on WhatsApp:");
    }
    output::info(&submission.url);
    tracing::debug!(grade = submission.grade.as_str(), "confirmation shown");

    loop {
        let items = vec![
            MenuUIItem::new("new", "Start New Quote", "Clear your answers and begin again"),
            MenuUIItem::new("copy", "Copy Details", "Print the message to paste anywhere"),
            MenuUIItem::new(EXIT_KEY, "Exit", ""),
        ];
        match choice_menu("What next?", &submission.message, items, None, false)? {
            ChoicePromptResult::Value(key) if key == "new" => return Ok(Flow::Restart),
            ChoicePromptResult::Value(key) if key == "copy" => {
                output::blank_line();
                println!("{}", submission.message);
                output::blank_line();
            }
            _ => {
                output::info("Thanks! We will be in touch on WhatsApp.");
                return Ok(Flow::Exit);
            }
        }
    }
}
