use anyhow::Result;
use clap::Parser;
use shared::{
    AddOutcome, Config, Provider, SalaryRange, SearchCriteria, Vacancy, VacancyClient,
    VacancyStore,
};
use std::io::{self as stdio, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy)]
enum Action {
    Search,
    Save,
    Filter,
    Delete,
}

/// Results of the most recent search, kept so "save" can pick by number
/// and tag the entry with the query that found it.
struct LastSearch {
    query: String,
    results: Vec<Vacancy>,
}

#[derive(Parser)]
#[command(name = "job-search")]
#[command(about = "Search job boards and manage a saved vacancy list")]
struct Args {
    /// File the saved vacancy list is kept in
    #[arg(short, long, default_value = "vacancies.json")]
    file: PathBuf,

    /// Job board to search (hh, sj); prompts each round if omitted
    #[arg(short, long)]
    provider: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = Config::from_env();

    let fixed_provider = match args.provider.as_deref() {
        Some(slug) => Some(
            Provider::from_slug(slug)
                .ok_or_else(|| anyhow::anyhow!("Invalid provider: {}. Use 'hh' or 'sj'", slug))?,
        ),
        None => None,
    };

    let client = VacancyClient::new(config.superjob_api_key)?;
    let mut store = VacancyStore::load(&args.file);
    println!(
        "✓ {} saved vacancies in {}",
        store.len(),
        args.file.display()
    );

    let mut last_search: Option<LastSearch> = None;

    loop {
        let provider = match fixed_provider {
            Some(provider) => provider,
            None => match prompt_provider_selection() {
                Ok(Some(provider)) => provider,
                Ok(None) => break,
                Err(e) => {
                    println!("✗ {}", e);
                    continue;
                }
            },
        };

        let action = match prompt_action_selection() {
            Ok(Some(action)) => action,
            Ok(None) => break,
            Err(e) => {
                println!("✗ {}", e);
                continue;
            }
        };

        let result = match action {
            Action::Search => search(&client, provider, &mut last_search).await,
            Action::Save => save(&mut store, &last_search),
            Action::Filter => filter_saved(&store),
            Action::Delete => delete_saved(&mut store),
        };
        if let Err(e) = result {
            println!("✗ {}", e);
        }
    }

    Ok(())
}

async fn search(
    client: &VacancyClient,
    provider: Provider,
    last_search: &mut Option<LastSearch>,
) -> Result<()> {
    let Some(query) = prompt("Search query: ")? else {
        return Ok(());
    };
    if query.is_empty() {
        println!("Nothing to search for.");
        return Ok(());
    }

    println!("\n🔎 Searching {}...", provider);
    let results = client.fetch(provider, &query).await?;

    if results.is_empty() {
        println!("No vacancies found for \"{}\".", query);
        return Ok(());
    }

    println!("✓ Found {} vacancies\n", results.len());
    print_vacancies(&results);
    *last_search = Some(LastSearch { query, results });
    Ok(())
}

fn save(store: &mut VacancyStore, last_search: &Option<LastSearch>) -> Result<()> {
    let Some(last_search) = last_search else {
        println!("No search results yet - run a search first.");
        return Ok(());
    };

    let Some(input) = prompt("Number of the vacancy to save: ")? else {
        return Ok(());
    };
    let Some(index) = parse_listing_number(&input, last_search.results.len()) else {
        println!("No vacancy with that number.");
        return Ok(());
    };

    let vacancy = last_search.results[index].clone();
    match store.add(vacancy, Some(&last_search.query))? {
        AddOutcome::Added => println!("✓ Saved to {}", store.path().display()),
        AddOutcome::Duplicate => println!("Already saved (same link)."),
    }
    Ok(())
}

fn filter_saved(store: &VacancyStore) -> Result<()> {
    let Some(salary_input) = prompt("Salary range MIN-MAX (blank for any): ")? else {
        return Ok(());
    };
    let salary = if salary_input.is_empty() {
        None
    } else {
        Some(SalaryRange::parse(&salary_input)?)
    };

    let Some(keyword) = prompt("Description keyword (blank for any): ")? else {
        return Ok(());
    };
    let description = (!keyword.is_empty()).then_some(keyword);

    let matches = store.query(&SearchCriteria {
        salary,
        description,
    });
    if matches.is_empty() {
        println!("No saved vacancies match.");
    } else {
        println!(
            "✓ {} of {} saved vacancies match\n",
            matches.len(),
            store.len()
        );
        print_vacancies(&matches);
    }
    Ok(())
}

fn delete_saved(store: &mut VacancyStore) -> Result<()> {
    if store.is_empty() {
        println!("No saved vacancies to delete.");
        return Ok(());
    }

    print_vacancies(store.all());
    let Some(input) = prompt("Number of the vacancy to delete: ")? else {
        return Ok(());
    };
    let Some(index) = parse_listing_number(&input, store.len()) else {
        println!("No vacancy with that number.");
        return Ok(());
    };

    match store.delete(index)? {
        Some(removed) => println!("✓ Deleted \"{}\"", removed.title),
        None => println!("No vacancy with that number."),
    }
    Ok(())
}

/// Map 1-based user input onto a 0-based index into a listing of `len`.
fn parse_listing_number(input: &str, len: usize) -> Option<usize> {
    let number: usize = input.parse().ok()?;
    let index = number.checked_sub(1)?;
    (index < len).then_some(index)
}

fn print_vacancies(vacancies: &[Vacancy]) {
    for (i, vacancy) in vacancies.iter().enumerate() {
        println!("{:>3}) {}", i + 1, vacancy.title);
        println!("     Link:        {}", vacancy.link);
        println!("     Salary:      {}", vacancy.salary);
        if !vacancy.description.is_empty() {
            println!("     Description: {}", vacancy.description);
        }
        println!();
    }
}

fn prompt_provider_selection() -> Result<Option<Provider>> {
    println!("\nWhich job board?");
    println!("  1) HeadHunter");
    println!("  2) SuperJob");
    println!("  3) Quit");
    let Some(choice) = prompt("\nEnter your choice (1-3): ")? else {
        return Ok(None);
    };

    match choice.as_str() {
        "1" => Ok(Some(Provider::HeadHunter)),
        "2" => Ok(Some(Provider::SuperJob)),
        "3" => Ok(None),
        _ => anyhow::bail!("Invalid selection. Please choose 1, 2, or 3."),
    }
}

fn prompt_action_selection() -> Result<Option<Action>> {
    println!("\nWhat next?");
    println!("  1) Search vacancies");
    println!("  2) Save a search result");
    println!("  3) Filter saved vacancies");
    println!("  4) Delete a saved vacancy");
    println!("  5) Quit");
    let Some(choice) = prompt("\nEnter your choice (1-5): ")? else {
        return Ok(None);
    };

    match choice.as_str() {
        "1" => Ok(Some(Action::Search)),
        "2" => Ok(Some(Action::Save)),
        "3" => Ok(Some(Action::Filter)),
        "4" => Ok(Some(Action::Delete)),
        "5" => Ok(None),
        _ => anyhow::bail!("Invalid selection. Please choose 1-5."),
    }
}

/// Read one trimmed line from stdin; `None` means stdin is closed.
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    stdio::stdout().flush()?;

    let mut input = String::new();
    if stdio::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
