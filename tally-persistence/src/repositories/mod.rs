pub mod board_repository;
pub mod profile_repository;

pub use board_repository::SharedBoardRepository;
pub use profile_repository::ProfileRepository;
