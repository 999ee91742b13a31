use std::{env, error::Error, process, str::FromStr, sync::Arc};

use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;

use paycycle_core::{
    config::ConfigManager,
    core::household_manager::NoticeLevel,
    core::services::{DueStatus, EventKind},
    domain::wire,
    init,
    storage::JsonStorage,
    sync::NullBroadcast,
    time::SystemClock,
    utils::{build_info, format},
    Frequency, HouseholdManager, NewBill, SettingsUpdate,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("{} {err}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_else(|| {
        print_usage();
        process::exit(1);
    });
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "version" | "--version" => {
            println!("{}", build_info::summary());
            return Ok(());
        }
        "help" | "--help" | "-h" => {
            print_usage();
            return Ok(());
        }
        _ => {}
    }

    let mut manager = open_manager()?;
    if let Some(report) = manager.maintenance_tick()? {
        if !report.is_empty() {
            tracing::debug!(pruned = report.pruned, generated = report.generated, "startup sweep");
        }
    }
    print_notices(&mut manager);

    match command.as_str() {
        "overview" => {
            if let Some(raw) = rest.first() {
                let direction: i32 = raw
                    .trim_start_matches('+')
                    .parse()
                    .map_err(|_| format!("period offset must be a whole number, got `{raw}`"))?;
                manager.navigate_period(direction)?;
            }
            show_overview(&manager)?;
        }
        "calendar" => show_calendar(&manager)?,
        "events" => show_events(&manager),
        "add" => {
            let [name, amount, due, category, frequency] = expect_args::<5>(&rest, "add")?;
            let bill = NewBill {
                name,
                amount: Decimal::from_str(amount.trim())
                    .map_err(|_| format!("amount must be a number, got `{amount}`"))?,
                due_date: parse_date(&due)?,
                category,
                frequency: Frequency::from_str(&frequency)?,
            };
            let id = manager.add_bill(bill)?;
            let generated = manager.state().instances_of(id).count();
            println!(
                "{} bill {} ({} future instances)",
                "Added".green().bold(),
                id.short(),
                generated
            );
        }
        "pay" => {
            let [raw_id] = expect_args::<1>(&rest, "pay")?;
            let id = manager.find_bill_by_prefix(&raw_id)?;
            let paid = manager.toggle_paid(id)?;
            let name = manager
                .state()
                .bill(id)
                .map(|bill| bill.name.clone())
                .unwrap_or_default();
            let verb = if paid { "paid" } else { "unpaid" };
            println!("Marked {name} as {verb}");
        }
        "maintain" => {
            let report = manager.run_maintenance()?;
            println!(
                "Maintenance: pruned {} bill(s), generated {} instance(s)",
                report.pruned, report.generated
            );
        }
        "share" => {
            let code = manager.generate_share_code()?;
            println!("{code}");
            eprintln!(
                "Share code valid for {} hours",
                manager.config().share_code_ttl_hours
            );
        }
        "join" => {
            let [code] = expect_args::<1>(&rest, "join")?;
            manager.join_with_share_code(&code)?;
            println!(
                "{} {}",
                "Joined".green().bold(),
                manager.state().settings.household_name
            );
        }
        "settings" => {
            let [key, value] = expect_args::<2>(&rest, "settings")?;
            manager.update_settings(settings_update(&key, &value)?)?;
            println!("Updated {key}");
        }
        "reset" => {
            manager.reset()?;
            print_notices(&mut manager);
            println!("Household reset to sample data");
        }
        other => {
            eprintln!("Unknown command `{other}`");
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}

fn open_manager() -> CliResult<HouseholdManager> {
    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;
    let data_dir = config.resolve_data_dir(config_manager.base_dir());
    let storage = JsonStorage::new(Some(data_dir))?;
    Ok(HouseholdManager::open(
        Box::new(storage),
        Arc::new(SystemClock),
        Box::new(NullBroadcast),
        config,
    ))
}

fn print_notices(manager: &mut HouseholdManager) {
    for notice in manager.take_notices() {
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message.cyan()),
            NoticeLevel::Warning => eprintln!("{} {}", "Warning:".yellow().bold(), notice.message),
        }
    }
}

fn expect_args<const N: usize>(args: &[String], command: &str) -> CliResult<[String; N]> {
    <[String; N]>::try_from(args.to_vec()).map_err(|_| {
        format!(
            "`{command}` expects {} argument(s); run `paycycle_cli help` for usage",
            N
        )
        .into()
    })
}

fn parse_date(raw: &str) -> CliResult<NaiveDate> {
    wire::parse_iso_date(raw).ok_or_else(|| format!("expected a YYYY-MM-DD date, got `{raw}`").into())
}

fn parse_flag(raw: &str) -> CliResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("expected on/off, got `{raw}`").into()),
    }
}

fn settings_update(key: &str, value: &str) -> CliResult<SettingsUpdate> {
    let mut update = SettingsUpdate::default();
    match key {
        "name" | "household" => update.household_name = Some(value.to_string()),
        "partner1" => update.partner1 = Some(value.to_string()),
        "partner2" => update.partner2 = Some(value.to_string()),
        "income" => {
            update.biweekly_income = Some(
                Decimal::from_str(value.trim())
                    .map_err(|_| format!("income must be a number, got `{value}`"))?,
            )
        }
        "payday" => update.payday = Some(parse_date(value)?),
        "notifications" => update.notifications = Some(parse_flag(value)?),
        other => {
            return Err(format!(
                "unknown setting `{other}` (name, partner1, partner2, income, payday, notifications)"
            )
            .into())
        }
    }
    Ok(update)
}

fn show_overview(manager: &HouseholdManager) -> CliResult<()> {
    let currency = manager.config().currency.as_str();
    let overview = manager.overview()?;
    let flow = overview.cash_flow;
    let settings = &manager.state().settings;

    println!("{}", settings.household_name.bold());
    println!("{}", format::format_period_label(&overview.period));
    println!();
    println!("  Income           {}", format::format_currency(flow.income, currency));
    println!(
        "  Available cash   {}",
        format::format_currency(flow.available_cash, currency).green()
    );
    println!(
        "  Projected        {}",
        format::format_currency(flow.projected_balance, currency)
    );
    println!(
        "  Bills            {} paid / {} unpaid",
        format::format_currency(flow.paid_bills, currency),
        format::format_currency(flow.unpaid_bills, currency)
    );
    let change = format::format_signed_currency(overview.balance_change, currency);
    println!("  Change           {change} from last period");
    println!();

    if overview.bills.is_empty() {
        println!("No bills due this period.");
        return Ok(());
    }
    for view in &overview.bills {
        let bill = view.bill;
        let status = format::due_status_text(view.status, bill.due_date);
        let status = match view.status {
            DueStatus::Paid => status.dimmed(),
            DueStatus::Overdue { .. } => status.red(),
            s if s.needs_attention() => status.yellow(),
            _ => status.normal(),
        };
        println!(
            "  {}  {:<20} {:>9}  {:<5} {}",
            bill.id.short(),
            bill.name,
            format::format_currency(bill.amount, currency),
            bill.frequency.badge(),
            status
        );
    }
    Ok(())
}

fn show_calendar(manager: &HouseholdManager) -> CliResult<()> {
    let period = manager.current_period()?;
    let days = manager.calendar()?;
    println!("{}", format::format_period_label(&period).bold());
    println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
    for week in days.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|day| {
                let marker = match (day.is_payday, day.bills.is_empty()) {
                    (true, _) => '$',
                    (false, false) => '*',
                    (false, true) => ' ',
                };
                let cell = if day.is_today {
                    format!("[{:>2}]{marker}", chrono::Datelike::day(&day.date))
                } else {
                    format!(" {:>2} {marker}", chrono::Datelike::day(&day.date))
                };
                if !day.in_month {
                    cell.dimmed().to_string()
                } else if day.in_period {
                    cell.bold().to_string()
                } else {
                    cell
                }
            })
            .collect();
        println!("{}", row.join(""));
    }
    println!("$ payday   * bill due   [ ] today");
    Ok(())
}

fn show_events(manager: &HouseholdManager) {
    let currency = manager.config().currency.as_str();
    let today = manager.today();
    let events = manager.upcoming_events();
    if events.is_empty() {
        println!("Nothing due in the next {} days.", manager.config().upcoming_window_days);
        return;
    }
    for event in events {
        let amount = format::format_signed_currency(event.amount, currency);
        let amount = match event.kind {
            EventKind::Payday => amount.green(),
            EventKind::Bill => amount.red(),
        };
        println!(
            "  {:<9} {:<20} {}",
            format::event_date_text(event.date, today),
            event.name,
            amount
        );
    }
}

fn print_usage() {
    eprintln!(
        "Usage: paycycle_cli <command>\n\
         Commands:\n  \
         overview [+N|-N]                                 show the selected pay period\n  \
         calendar                                         month grid around the period\n  \
         events                                           bills and paydays this week\n  \
         add <name> <amount> <yyyy-mm-dd> <category> <frequency>\n  \
         pay <bill-id>                                    toggle a bill's paid flag\n  \
         maintain                                         prune and replenish bills\n  \
         share                                            print a 24h share code\n  \
         join <code>                                      load a shared household\n  \
         settings <key> <value>                           name, partner1, partner2, income, payday, notifications\n  \
         reset                                            clear data and reload the sample\n  \
         version"
    );
}
