mod context_records;
