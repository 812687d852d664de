pub mod iso_date;
