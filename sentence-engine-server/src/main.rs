use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde::Serialize;

use sentence_engine_core::SentenceError;
use sentence_engine_core::collections::weighted::{WeightedEntry, WeightedLiteral};
use sentence_engine_core::sentence::config::{Configuration, TemplateInput, VocabularyInput};
use sentence_engine_core::sentence::defaults;
use sentence_engine_core::sentence::engine::SentenceEngine;

/// Default bind address, overridden by `SENTENCE_ENGINE_ADDR`.
const DEFAULT_ADDR: &str = "127.0.0.1:5000";

struct SharedData {
	engine: SentenceEngine,
}

type Shared = web::Data<Mutex<SharedData>>;

/// Maps an engine error to an HTTP response.
///
/// Configuration problems are the caller's fault (400); a placeholder that
/// cannot be resolved means the stored vocabulary does not fit the
/// templates (422).
fn error_response(e: &SentenceError) -> HttpResponse {
	match e {
		SentenceError::Configuration(_) => HttpResponse::BadRequest().body(e.to_string()),
		SentenceError::Resolution(_) => HttpResponse::UnprocessableEntity().body(e.to_string()),
	}
}

fn lock(data: &Shared) -> Result<MutexGuard<'_, SharedData>, HttpResponse> {
	data.lock().map_err(|_| {
		error!("Engine lock poisoned");
		HttpResponse::InternalServerError().body("Engine lock failed")
	})
}

/// Size of the stored collections, returned by every update endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
	templates: usize,
	vocabulary_keys: usize,
}

impl Summary {
	fn of(engine: &SentenceEngine) -> Self {
		Self {
			templates: engine.weighted_templates().len(),
			vocabulary_keys: engine.weighted_vocabulary().len(),
		}
	}
}

fn literals(entries: &[WeightedEntry]) -> Vec<WeightedLiteral> {
	entries.iter().filter_map(WeightedEntry::to_literal).collect()
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a new sentence and returns it as the response body.
#[get("/v1/generate")]
async fn get_generated(data: Shared) -> impl Responder {
	let mut shared_data = match lock(&data) {
		Ok(guard) => guard,
		Err(response) => return response,
	};

	match shared_data.engine.generate() {
		Ok(engine) => HttpResponse::Ok().body(engine.get().to_owned()),
		Err(e) => error_response(&e),
	}
}

/// HTTP GET endpoint `/v1/value`
///
/// Returns the last generated sentence without generating a new one.
#[get("/v1/value")]
async fn get_value(data: Shared) -> impl Responder {
	match lock(&data) {
		Ok(shared_data) => HttpResponse::Ok().body(shared_data.engine.get().to_owned()),
		Err(response) => response,
	}
}

#[get("/v1/templates")]
async fn get_templates(data: Shared) -> impl Responder {
	match lock(&data) {
		Ok(shared_data) => HttpResponse::Ok().json(literals(shared_data.engine.weighted_templates())),
		Err(response) => response,
	}
}

#[get("/v1/vocabulary")]
async fn get_vocabulary(data: Shared) -> impl Responder {
	let shared_data = match lock(&data) {
		Ok(guard) => guard,
		Err(response) => return response,
	};

	let vocabulary: HashMap<&str, Vec<WeightedLiteral>> = shared_data
		.engine
		.weighted_vocabulary()
		.iter()
		.map(|(key, alternatives)| (key.as_str(), literals(alternatives)))
		.collect();
	HttpResponse::Ok().json(vocabulary)
}

#[get("/v1/options")]
async fn get_options(data: Shared) -> impl Responder {
	match lock(&data) {
		Ok(shared_data) => HttpResponse::Ok().json(shared_data.engine.options()),
		Err(response) => response,
	}
}

/// HTTP PUT endpoint `/v1/configure`
///
/// Body: a JSON configuration; templates and vocabulary given there
/// replace the current ones, options are merged.
#[put("/v1/configure")]
async fn put_configure(data: Shared, config: web::Json<Configuration>) -> impl Responder {
	let mut shared_data = match lock(&data) {
		Ok(guard) => guard,
		Err(response) => return response,
	};

	match shared_data.engine.configure(config.into_inner()) {
		Ok(engine) => {
			info!("Engine reconfigured");
			HttpResponse::Ok().json(Summary::of(engine))
		}
		Err(e) => error_response(&e),
	}
}

/// HTTP PUT endpoint `/v1/templates`
///
/// Body: a template or a list of templates to add.
#[put("/v1/templates")]
async fn put_templates(data: Shared, templates: web::Json<TemplateInput>) -> impl Responder {
	let mut shared_data = match lock(&data) {
		Ok(guard) => guard,
		Err(response) => return response,
	};

	let engine = shared_data.engine.add_templates(templates.into_inner().into_entries());
	HttpResponse::Ok().json(Summary::of(engine))
}

/// HTTP PUT endpoint `/v1/vocabulary`
///
/// Body: a JSON map of key to alternatives to add.
#[put("/v1/vocabulary")]
async fn put_vocabulary(data: Shared, vocabulary: web::Json<VocabularyInput>) -> impl Responder {
	let mut shared_data = match lock(&data) {
		Ok(guard) => guard,
		Err(response) => return response,
	};

	match shared_data.engine.add_vocabulary(vocabulary.into_inner()) {
		Ok(engine) => HttpResponse::Ok().json(Summary::of(engine)),
		Err(e) => error_response(&e),
	}
}

#[put("/v1/restore_defaults")]
async fn put_restore_defaults(data: Shared) -> impl Responder {
	let mut shared_data = match lock(&data) {
		Ok(guard) => guard,
		Err(response) => return response,
	};

	match shared_data.engine.configure(defaults::configuration()) {
		Ok(engine) => HttpResponse::Ok().json(Summary::of(engine)),
		Err(e) => error_response(&e),
	}
}

/// Main entry point for the server.
///
/// Builds an engine on the default configuration, wraps it in a `Mutex`
/// (the engine itself is not synchronized) and starts an Actix-web HTTP
/// server.
///
/// # Notes
/// - The bind address comes from `SENTENCE_ENGINE_ADDR` (default `127.0.0.1:5000`).
/// - Log level comes from `RUST_LOG` (default `info`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let engine = SentenceEngine::new(Configuration::new()).map_err(std::io::Error::other)?;
	let shared_data = web::Data::new(Mutex::new(SharedData { engine }));

	let addr = std::env::var("SENTENCE_ENGINE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
	info!("Listening on {addr}");

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_value)
			.service(get_templates)
			.service(get_vocabulary)
			.service(get_options)
			.service(put_configure)
			.service(put_templates)
			.service(put_vocabulary)
			.service(put_restore_defaults)
	})
		.bind(addr)?
		.run()
		.await
}
