pub mod qdrant_repository;
