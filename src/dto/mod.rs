pub mod fleet_dto;

pub use fleet_dto::{
    ClientEvent, CreateVehicleData, ServerEvent, VehicleChanges,
};
