mod admin;
mod casino;
mod economy;
mod inventory;
mod market;
